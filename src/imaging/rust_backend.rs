//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image` crate (pure Rust decoders) |
//! | Decode (HEIC) | `libheif-rs`, behind the `heic` cargo feature |
//! | Text layout + coverage | `ab_glyph` via [`text`](super::text) |
//! | Composite | straight-alpha "over" in [`text::composite_over`](super::text::composite_over) |
//! | Encode → PNG | `image::DynamicImage::save_with_format` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_text_origin;
use super::params::StampParams;
use super::text::{composite_over, draw_text, measure_text};
use ab_glyph::FontArc;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;

/// Pure Rust backend using the `image` crate and `ab_glyph`.
///
/// Holds the font for the whole run; it is loaded once by the caller.
pub struct RustBackend {
    font: FontArc,
}

impl RustBackend {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }
}

fn is_heic(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("heic"))
}

/// Load and decode an image from disk as 8-bit RGBA.
fn load_image(path: &Path) -> Result<RgbaImage, BackendError> {
    if is_heic(path) {
        return decode_heic(path);
    }
    let decoded = ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;
    Ok(decoded.to_rgba8())
}

#[cfg(feature = "heic")]
fn heic_path(path: &Path) -> Result<&str, BackendError> {
    path.to_str().ok_or_else(|| {
        BackendError::ProcessingFailed(format!("Non UTF-8 path: {}", path.display()))
    })
}

#[cfg(feature = "heic")]
fn heic_error(path: &Path, e: libheif_rs::HeifError) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to read HEIC {}: {}", path.display(), e))
}

#[cfg(feature = "heic")]
fn identify_heic(path: &Path) -> Result<Dimensions, BackendError> {
    let ctx = libheif_rs::HeifContext::read_from_file(heic_path(path)?)
        .map_err(|e| heic_error(path, e))?;
    let handle = ctx.primary_image_handle().map_err(|e| heic_error(path, e))?;
    Ok(Dimensions {
        width: handle.width(),
        height: handle.height(),
    })
}

/// Decode the primary image of a HEIC file with libheif, as interleaved RGBA.
#[cfg(feature = "heic")]
fn decode_heic(path: &Path) -> Result<RgbaImage, BackendError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_file(heic_path(path)?).map_err(|e| heic_error(path, e))?;
    let handle = ctx.primary_image_handle().map_err(|e| heic_error(path, e))?;
    let image = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(|e| heic_error(path, e))?;

    let planes = image.planes();
    let plane = planes.interleaved.ok_or_else(|| {
        BackendError::ProcessingFailed(format!("No interleaved plane in {}", path.display()))
    })?;

    strip_row_padding(plane.data, plane.stride, plane.width, plane.height)
        .and_then(|pixels| RgbaImage::from_raw(plane.width, plane.height, pixels))
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Truncated HEIC pixels in {}", path.display()))
        })
}

/// Copy `height` rows of `width` RGBA pixels out of a buffer whose rows are
/// `stride` bytes apart. `None` if the buffer is too short.
#[cfg(any(feature = "heic", test))]
fn strip_row_padding(data: &[u8], stride: usize, width: u32, height: u32) -> Option<Vec<u8>> {
    let row_len = width as usize * 4;
    if stride < row_len {
        return None;
    }
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(data.get(start..start + row_len)?);
    }
    Some(pixels)
}

#[cfg(not(feature = "heic"))]
fn identify_heic(path: &Path) -> Result<Dimensions, BackendError> {
    Err(heic_unsupported(path))
}

#[cfg(not(feature = "heic"))]
fn decode_heic(path: &Path) -> Result<RgbaImage, BackendError> {
    Err(heic_unsupported(path))
}

#[cfg(not(feature = "heic"))]
fn heic_unsupported(path: &Path) -> BackendError {
    BackendError::Unsupported(format!(
        "{}: HEIC decoding needs the `heic` feature",
        path.display()
    ))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        if is_heic(path) {
            return identify_heic(path);
        }
        let (width, height) = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn stamp(&self, params: &StampParams) -> Result<(), BackendError> {
        let mut base = load_image(&params.source)?;
        let size = params.font_size as f32;

        let bounds = measure_text(&self.font, size, &params.text).ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Nothing to draw for {:?}", params.text))
        })?;
        let (x, y) = calculate_text_origin(base.dimensions(), &bounds, params.padding);

        // Text goes on its own transparent layer, then the layer is composited
        let mut layer = RgbaImage::new(base.width(), base.height());
        let style = params.style;
        let offset = style.outline_offset.min(i32::MAX as u32) as i32;
        if offset > 0 {
            for (dx, dy) in [(-offset, -offset), (offset, offset)] {
                draw_text(
                    &mut layer,
                    &self.font,
                    size,
                    (x.saturating_add(dx), y.saturating_add(dy)),
                    style.outline,
                    &params.text,
                );
            }
        }
        draw_text(&mut layer, &self.font, size, (x, y), style.fill, &params.text);

        composite_over(&mut base, &layer);

        DynamicImage::ImageRgba8(base)
            .save_with_format(&params.output, ImageFormat::Png)
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))
    }
}
