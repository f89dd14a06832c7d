//! The stamping run loop.
//!
//! For every image [`scan`](crate::scan) finds in one directory:
//!
//! 1. Resolve its date ([`date::resolve_photo_date`]).
//! 2. Render the date with the configured `strftime` pattern.
//! 3. Stamp it into the bottom-right corner and write `<stem><suffix>.png`
//!    next to the original ([`imaging::stamp_date`]).
//!
//! Files are processed one at a time in file name order. A file that fails
//! to decode, stamp or save is reported as a [`StampEvent::Failed`] and the
//! loop moves on; only problems found before the first file is touched
//! (unreadable directory, bad configuration, no usable font) end the run.
//!
//! Progress is reported through a callback so the caller decides how to
//! display it; the binary formats events with [`crate::output`].

use crate::config::{ConfigError, StampConfig};
use crate::date::{self, DateSource, PhotoDate};
use crate::imaging::{
    FontError, ImageBackend, RustBackend, TextLayout, load_font, stamp_date,
};
use crate::naming;
use crate::scan::{self, ScanError};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StampError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Settings for one run, with colours already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    pub date_format: String,
    pub suffix: String,
    pub skip_stamped: bool,
    pub layout: TextLayout,
}

impl ProcessConfig {
    /// Build a ProcessConfig from StampConfig values.
    pub fn from_config(config: &StampConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            date_format: config.date_format.clone(),
            suffix: config.suffix.clone(),
            skip_stamped: config.skip_stamped,
            layout: TextLayout::from_config(&config.text)?,
        })
    }

    fn render(&self, date: NaiveDate) -> String {
        date::format_date(date, &self.date_format).unwrap_or_else(|| date.to_string())
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            suffix: "_dated".to_string(),
            skip_stamped: false,
            layout: TextLayout::default(),
        }
    }
}

/// Progress of a run, one event per image.
#[derive(Debug, Clone, PartialEq)]
pub enum StampEvent {
    Stamped {
        source: PathBuf,
        output: PathBuf,
        /// The text that was drawn.
        date: String,
        date_source: DateSource,
    },
    Failed {
        source: PathBuf,
        error: String,
    },
    /// Left alone because it is the output of an earlier run.
    Skipped {
        source: PathBuf,
    },
}

/// Counts for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stamped: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, event: &StampEvent) {
        match event {
            StampEvent::Stamped { .. } => self.stamped += 1,
            StampEvent::Failed { .. } => self.failed += 1,
            StampEvent::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Stamp every image in `dir` with the real backend.
///
/// Loads the font (with fallback) before touching any file.
pub fn stamp_directory(
    dir: &Path,
    config: &StampConfig,
    on_event: impl FnMut(&StampEvent),
) -> Result<RunSummary, StampError> {
    let process_config = ProcessConfig::from_config(config)?;
    let font = load_font(&config.font, &config.fallback_fonts)?;
    info!(
        dir = %dir.display(),
        font = %font.path.display(),
        fallback = font.is_fallback,
        "stamping directory"
    );

    let backend = RustBackend::new(font.font);
    stamp_directory_with_backend(&backend, dir, &process_config, date::today(), on_event)
}

/// Stamp every image in `dir` using a specific backend (allows testing with mock).
///
/// `today` is the last-resort date for images with no other date source.
pub fn stamp_directory_with_backend(
    backend: &impl ImageBackend,
    dir: &Path,
    config: &ProcessConfig,
    today: NaiveDate,
    mut on_event: impl FnMut(&StampEvent),
) -> Result<RunSummary, StampError> {
    let listing = scan::scan(dir, &config.suffix, config.skip_stamped)?;
    let mut summary = RunSummary::default();

    for source in listing.skipped {
        let event = StampEvent::Skipped { source };
        summary.record(&event);
        on_event(&event);
    }

    for source in listing.images {
        let event = stamp_one(backend, &source, config, today);
        summary.record(&event);
        on_event(&event);
    }

    Ok(summary)
}

fn stamp_one(
    backend: &impl ImageBackend,
    source: &Path,
    config: &ProcessConfig,
    today: NaiveDate,
) -> StampEvent {
    let PhotoDate { date, source: date_source } = date::resolve_photo_date(source, today);
    let text = config.render(date);
    let output = naming::stamped_output_path(source, &config.suffix);

    match stamp_date(backend, source, &output, &text, &config.layout) {
        Ok(stamped) => {
            debug!(
                file = %source.display(),
                width = stamped.width,
                height = stamped.height,
                font_size = stamped.font_size,
                padding = stamped.padding,
                "stamped"
            );
            StampEvent::Stamped {
                source: source.to_path_buf(),
                output: stamped.output,
                date: text,
                date_source,
            }
        }
        Err(e) => {
            debug!(file = %source.display(), error = ?e, "stamp failed");
            StampEvent::Failed {
                source: source.to_path_buf(),
                error: e.to_string(),
            }
        }
    }
}

/// The date an image would be stamped with, from a dry run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckEntry {
    pub source: PathBuf,
    pub output: PathBuf,
    pub date: String,
    pub date_source: DateSource,
}

/// Resolve the date of every image in `dir` without decoding or writing anything.
pub fn check_directory(
    dir: &Path,
    config: &ProcessConfig,
    today: NaiveDate,
) -> Result<Vec<CheckEntry>, StampError> {
    let listing = scan::scan(dir, &config.suffix, config.skip_stamped)?;
    Ok(listing
        .images
        .into_iter()
        .map(|source| {
            let resolved = date::resolve_photo_date(&source, today);
            CheckEntry {
                output: naming::stamped_output_path(&source, &config.suffix),
                date: config.render(resolved.date),
                date_source: resolved.source,
                source,
            }
        })
        .collect())
}
