//! Parameter types for image operations.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between [`operations`](super::operations), which sizes and places the
//! stamp, and the [`backend`](super::backend), which does the pixel work.
//!
//! ## Types
//!
//! - [`TextStyle`]: fill colour, outline colour and outline offset.
//! - [`StampParams`]: everything needed to draw one stamp.

use image::Rgba;
use std::path::PathBuf;

/// Colours and stroke of the stamped text.
///
/// The outline is not a true stroke: the text is drawn twice in
/// `outline`, shifted by `(-offset, -offset)` and `(+offset, +offset)`, then
/// once in `fill` on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub fill: Rgba<u8>,
    pub outline: Rgba<u8>,
    pub outline_offset: u32,
}

impl TextStyle {
    /// Orange on a one-pixel black outline, the film date-back look.
    pub fn date_back() -> Self {
        Self {
            fill: Rgba([255, 165, 0, 255]),
            outline: Rgba([0, 0, 0, 255]),
            outline_offset: 1,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::date_back()
    }
}

/// Parameters for stamping text into the bottom-right corner of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct StampParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub text: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Inset of the text's bottom-right corner from the image corner, in pixels.
    pub padding: u32,
    pub style: TextStyle,
}
