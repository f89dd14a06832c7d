//! Run configuration.
//!
//! Every setting has a stock default, so a plain `datestamp stamp photos/`
//! needs no configuration at all. A TOML file passed with `--config` is
//! merged on top of the stock defaults, then CLI flags override the result.
//! No configuration file is ever picked up implicitly.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! font = "digital-7.ttf"     # Preferred (retro LCD) TrueType font
//! fallback_fonts = [...]     # Tried in order when `font` cannot be loaded
//! date_format = "%Y-%m-%d"   # strftime format of the stamped text
//! suffix = "_dated"          # photo.jpg -> photo_dated.png
//! skip_stamped = false       # Ignore inputs that already carry the suffix
//!
//! [text]
//! base_size = 1080           # Reference shorter side, in pixels
//! base_font_size = 40        # Font size at the reference shorter side
//! padding_ratio = 0.02       # Inset from the corner, fraction of shorter side
//! fill = "#ffa500"           # Text colour (#rrggbb or #rrggbbaa)
//! outline = "#000000"        # Stroke colour
//! outline_offset = 1         # Stroke offset in pixels
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration for a stamping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampConfig {
    /// Preferred font file for the date text.
    pub font: PathBuf,
    /// Fonts tried in order when `font` is missing or unreadable.
    pub fallback_fonts: Vec<PathBuf>,
    /// `strftime` pattern used to render the resolved date.
    pub date_format: String,
    /// Appended to the input stem to form the output name.
    pub suffix: String,
    /// Skip inputs whose stem already ends with `suffix`.
    pub skip_stamped: bool,
    /// Size, placement and colours of the stamped text.
    pub text: TextConfig,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            font: PathBuf::from("digital-7.ttf"),
            fallback_fonts: default_fallback_fonts(),
            date_format: "%Y-%m-%d".to_string(),
            suffix: "_dated".to_string(),
            skip_stamped: false,
            text: TextConfig::default(),
        }
    }
}

/// Well-known locations of a plain sans-serif font on Linux, macOS and Windows.
fn default_fallback_fonts() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "C:\\Windows\\Fonts\\arial.ttf",
        "arial.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// Text sizing, placement and colours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Shorter image side (px) at which the font is exactly `base_font_size`.
    pub base_size: u32,
    /// Font size used for an image whose shorter side equals `base_size`.
    pub base_font_size: u32,
    /// Corner inset as a fraction of the shorter image side.
    pub padding_ratio: f64,
    /// Fill colour as `#rrggbb` or `#rrggbbaa`.
    pub fill: String,
    /// Stroke colour as `#rrggbb` or `#rrggbbaa`.
    pub outline: String,
    /// Stroke offset in pixels; the outline is drawn at `-offset` and `+offset`.
    pub outline_offset: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            base_size: 1080,
            base_font_size: 40,
            padding_ratio: 0.02,
            fill: "#ffa500".to_string(),
            outline: "#000000".to_string(),
            outline_offset: 1,
        }
    }
}

impl TextConfig {
    /// Parsed fill colour as RGBA.
    pub fn fill_rgba(&self) -> Result<[u8; 4], ConfigError> {
        parse_hex_color(&self.fill)
    }

    /// Parsed outline colour as RGBA.
    pub fn outline_rgba(&self) -> Result<[u8; 4], ConfigError> {
        parse_hex_color(&self.outline)
    }
}

impl StampConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text.base_size == 0 {
            return Err(ConfigError::Validation(
                "text.base_size must be non-zero".into(),
            ));
        }
        if self.text.base_font_size == 0 {
            return Err(ConfigError::Validation(
                "text.base_font_size must be non-zero".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.text.padding_ratio) {
            return Err(ConfigError::Validation(
                "text.padding_ratio must be in [0, 0.5)".into(),
            ));
        }
        self.text.fill_rgba()?;
        self.text.outline_rgba()?;
        if self.suffix.is_empty() {
            return Err(ConfigError::Validation("suffix must not be empty".into()));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "suffix must not contain path separators".into(),
            ));
        }
        if self.date_format.is_empty() {
            return Err(ConfigError::Validation(
                "date_format must not be empty".into(),
            ));
        }
        let rendered = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|sample| crate::date::format_date(sample, &self.date_format));
        match rendered {
            None => {
                return Err(ConfigError::Validation(format!(
                    "date_format '{}' is not a valid date pattern",
                    self.date_format
                )));
            }
            Some(text) if text.trim().is_empty() => {
                return Err(ConfigError::Validation(format!(
                    "date_format '{}' renders no visible text",
                    self.date_format
                )));
            }
            Some(_) => {}
        }
        Ok(())
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA bytes.
pub fn parse_hex_color(value: &str) -> Result<[u8; 4], ConfigError> {
    let invalid = || ConfigError::Validation(format!("invalid colour '{value}'"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StampConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<StampConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StampConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit TOML file, or stock defaults when `None`.
pub fn load_config(path: Option<&Path>) -> Result<StampConfig, ConfigError> {
    let overlay = match path {
        Some(p) => {
            let content = fs::read_to_string(p)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# datestamp configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Pass the file with --config.
# Unknown keys will cause an error.

# Preferred font for the date text. A seven-segment "digital" font gives the
# classic film-camera date-back look.
font = "digital-7.ttf"

# Tried in order when `font` cannot be loaded.
# fallback_fonts = ["/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"]

# strftime pattern of the stamped text.
date_format = "%Y-%m-%d"

# photo.jpg -> photo<suffix>.png, written next to the original.
suffix = "_dated"

# Ignore inputs whose name already ends with the suffix (re-runs).
skip_stamped = false

# ---------------------------------------------------------------------------
# Text
# ---------------------------------------------------------------------------
[text]
# The font is `base_font_size` on an image whose shorter side is
# `base_size` pixels, and scales linearly from there.
base_size = 1080
base_font_size = 40

# Inset from the bottom-right corner, as a fraction of the shorter side.
padding_ratio = 0.02

# Colours as #rrggbb or #rrggbbaa.
fill = "#ffa500"
outline = "#000000"

# The outline is the text drawn at (-offset, -offset) and (+offset, +offset).
outline_offset = 1
"##
}
