//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_font_size, calculate_padding};
use super::params::{StampParams, TextStyle};
use crate::config::{ConfigError, TextConfig};
use image::Rgba;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Sizing and styling rules for the stamp, independent of any one image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub base_size: u32,
    pub base_font_size: u32,
    pub padding_ratio: f64,
    pub style: TextStyle,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            base_size: 1080,
            base_font_size: 40,
            padding_ratio: 0.02,
            style: TextStyle::date_back(),
        }
    }
}

impl TextLayout {
    /// Build from the `[text]` config table, parsing its colours.
    pub fn from_config(text: &TextConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            base_size: text.base_size,
            base_font_size: text.base_font_size,
            padding_ratio: text.padding_ratio,
            style: TextStyle {
                fill: Rgba(text.fill_rgba()?),
                outline: Rgba(text.outline_rgba()?),
                outline_offset: text.outline_offset,
            },
        })
    }
}

/// A stamp that was written, with the numbers used to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedImage {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub padding: u32,
}

/// Plan a stamp operation for an image of known size, without executing it.
pub fn plan_stamp(
    source: &Path,
    output: &Path,
    text: &str,
    dims: (u32, u32),
    layout: &TextLayout,
) -> StampParams {
    let (width, height) = dims;
    StampParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        text: text.to_string(),
        font_size: calculate_font_size(width, height, layout.base_size, layout.base_font_size),
        padding: calculate_padding(width, height, layout.padding_ratio),
        style: layout.style,
    }
}

/// Stamp `text` into the bottom-right corner of `source`, writing `output`.
///
/// Font size and inset are derived from the image's own dimensions, so the
/// stamp looks the same on a phone snapshot and a full-frame raw export.
pub fn stamp_date(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    text: &str,
    layout: &TextLayout,
) -> Result<StampedImage> {
    let dims = get_dimensions(backend, source)?;
    let params = plan_stamp(source, output, text, dims, layout);
    backend.stamp(&params)?;

    Ok(StampedImage {
        output: params.output,
        width: dims.0,
        height: dims.1,
        font_size: params.font_size,
        padding: params.padding,
    })
}
