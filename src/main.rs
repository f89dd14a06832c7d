use clap::{Parser, Subcommand};
use datestamp::{config, date, output, process};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datestamp")]
#[command(about = "Stamp photos with the date they were taken")]
#[command(long_about = "\
Stamp photos with the date they were taken

Every .png, .jpg, .jpeg and .heic file directly inside DIR gets a copy named
<name>_dated.png with its date in the bottom-right corner, in orange with a
black outline. Originals are never modified.

Date resolution (first available wins):
  1. EXIF DateTimeOriginal / DateTimeDigitized
  2. File creation time (modification time where unsupported)
  3. Today

Run 'datestamp gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML). Without it, stock defaults are used
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that read a directory.
#[derive(clap::Args, Clone)]
struct DirArgs {
    /// Directory containing the photos
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Output suffix appended to the file stem
    #[arg(long)]
    suffix: Option<String>,

    /// Ignore files that already end in the output suffix
    #[arg(long)]
    skip_stamped: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Stamp every photo in a directory
    Stamp {
        #[command(flatten)]
        args: DirArgs,

        /// TrueType font for the date text
        #[arg(long)]
        font: Option<PathBuf>,
    },
    /// Show the date each photo would get, without writing anything
    Check {
        #[command(flatten)]
        args: DirArgs,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Stamp { args, font } => {
            let mut config = config::load_config(cli.config.as_deref())?;
            apply_dir_args(&mut config, &args);
            if let Some(font) = font {
                config.font = font;
            }
            config.validate()?;

            let summary = process::stamp_directory(&args.dir, &config, output::print_stamp_event)?;
            output::print_summary(&summary);
        }
        Command::Check { args } => {
            let mut config = config::load_config(cli.config.as_deref())?;
            apply_dir_args(&mut config, &args);
            config.validate()?;

            let process_config = process::ProcessConfig::from_config(&config)?;
            let entries = process::check_directory(&args.dir, &process_config, date::today())?;
            output::print_check_output(&entries);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// CLI flags override the merged config.
fn apply_dir_args(config: &mut config::StampConfig, args: &DirArgs) {
    if let Some(suffix) = &args.suffix {
        config.suffix = suffix.clone();
    }
    if args.skip_stamped {
        config.skip_stamped = true;
    }
}
