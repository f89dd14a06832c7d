//! Font loading and text rasterisation.
//!
//! Fonts are loaded once per run with `ab_glyph` and shared by every image.
//! Text is laid out on a single line: glyphs are advanced horizontally with
//! kerning, the pen origin is the top-left of the line box and the baseline
//! sits at the font's ascent below it.
//!
//! Drawing blends each glyph's coverage into the target with straight
//! alpha, so text drawn on a fully transparent layer keeps its true colour
//! at the antialiased edges.

use super::calculations::TextBounds;
use ab_glyph::{Font, FontArc, GlyphId, OutlinedGlyph, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Cannot read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid font data in {0}")]
    Invalid(PathBuf),
    #[error("No usable font (tried {0})")]
    NoUsableFont(String),
}

/// A font ready for rendering, with the file it came from.
#[derive(Clone)]
pub struct LoadedFont {
    pub font: FontArc,
    pub path: PathBuf,
    /// `true` when the preferred font failed and a fallback was used.
    pub is_fallback: bool,
}

/// Load a single TrueType/OpenType font file.
pub fn load_font_file(path: &Path) -> Result<FontArc, FontError> {
    let data = std::fs::read(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(data).map_err(|_| FontError::Invalid(path.to_path_buf()))
}

/// Load `preferred`, falling back through `fallbacks` in order.
///
/// A fallback is logged as a warning. Fails only when nothing loads.
pub fn load_font(preferred: &Path, fallbacks: &[PathBuf]) -> Result<LoadedFont, FontError> {
    let first_error = match load_font_file(preferred) {
        Ok(font) => {
            return Ok(LoadedFont {
                font,
                path: preferred.to_path_buf(),
                is_fallback: false,
            });
        }
        Err(e) => e,
    };

    for candidate in fallbacks {
        if let Ok(font) = load_font_file(candidate) {
            warn!(
                preferred = %preferred.display(),
                error = %first_error,
                fallback = %candidate.display(),
                "preferred font unavailable, using fallback"
            );
            return Ok(LoadedFont {
                font,
                path: candidate.clone(),
                is_fallback: true,
            });
        }
    }

    let tried: Vec<String> = std::iter::once(preferred)
        .chain(fallbacks.iter().map(PathBuf::as_path))
        .map(|p| p.display().to_string())
        .collect();
    Err(FontError::NoUsableFont(tried.join(", ")))
}

/// Scale at which the font's em square is `size` pixels.
///
/// `PxScale` sets ascent minus descent, which is larger than the em for
/// most fonts.
fn em_scale(font: &FontArc, size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or_else(|| font.height_unscaled());
    PxScale::from(size * font.height_unscaled() / units_per_em)
}

/// Lay out `text` at an em size of `size` px, with the pen origin at (0, 0),
/// and outline every visible glyph.
fn layout(font: &FontArc, size: f32, text: &str) -> Vec<OutlinedGlyph> {
    let scale = em_scale(font, size);
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let mut outlined = Vec::with_capacity(text.len());

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(g) = font.outline_glyph(glyph) {
            outlined.push(g);
        }
    }
    outlined
}

/// Measure the ink bounds of `text` relative to the pen origin.
///
/// Returns `None` when nothing would be drawn (empty or whitespace-only text).
pub fn measure_text(font: &FontArc, size: f32, text: &str) -> Option<TextBounds> {
    layout(font, size, text)
        .iter()
        .map(|g| {
            let b = g.px_bounds();
            TextBounds {
                min_x: b.min.x.floor() as i32,
                min_y: b.min.y.floor() as i32,
                max_x: b.max.x.ceil() as i32,
                max_y: b.max.y.ceil() as i32,
            }
        })
        .reduce(TextBounds::union)
}

/// Draw `text` onto `canvas` with the pen origin at `origin`. Clips at the edges.
///
/// Coverage is blended in straight alpha rather than with imageproc's
/// weighted sum, which darkens antialiased edges on a transparent layer.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &FontArc,
    size: f32,
    origin: (i32, i32),
    color: Rgba<u8>,
    text: &str,
) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    for glyph in layout(font, size, text) {
        let bounds = glyph.px_bounds();
        let left = origin.0 as i64 + bounds.min.x.floor() as i64;
        let top = origin.1 as i64 + bounds.min.y.floor() as i64;

        glyph.draw(|gx, gy, coverage| {
            let x = left + gx as i64;
            let y = top + gy as i64;
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }
            let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32).round() as u8;
            if alpha == 0 {
                return;
            }
            blend_over(
                canvas.get_pixel_mut(x as u32, y as u32),
                Rgba([color[0], color[1], color[2], alpha]),
            );
        });
    }
}

/// Composite `layer` over `base`, pixel for pixel. Both must be the same size.
pub fn composite_over(base: &mut RgbaImage, layer: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
        if src[3] > 0 {
            blend_over(dst, *src);
        }
    }
}

/// Porter-Duff "over" in straight alpha, rounding each channel.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{capture_logs, system_font};
    use tempfile::TempDir;

    fn font() -> Option<FontArc> {
        system_font().map(|p| load_font_file(&p).unwrap())
    }

    #[test]
    fn load_font_file_missing_is_io_error() {
        let result = load_font_file(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(result, Err(FontError::Io { .. })));
    }

    #[test]
    fn load_font_file_garbage_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bogus.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(load_font_file(&path), Err(FontError::Invalid(_))));
    }

    #[test]
    fn load_font_nothing_usable_lists_candidates() {
        let result = load_font(
            Path::new("/nonexistent/a.ttf"),
            &[PathBuf::from("/nonexistent/b.ttf")],
        );
        match result {
            Err(FontError::NoUsableFont(tried)) => {
                assert!(tried.contains("a.ttf"));
                assert!(tried.contains("b.ttf"));
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn load_font_falls_back() {
        let Some(system) = system_font() else {
            return;
        };
        let (loaded, logs) = capture_logs(|| {
            load_font(Path::new("/nonexistent/digital-7.ttf"), &[system.clone()]).unwrap()
        });
        assert!(loaded.is_fallback);
        assert_eq!(loaded.path, system);
        assert!(logs.contains("WARN"), "logs: {logs}");
        assert!(logs.contains("using fallback"), "logs: {logs}");
        assert!(logs.contains("digital-7.ttf"), "logs: {logs}");
    }

    #[test]
    fn load_font_prefers_primary() {
        let Some(system) = system_font() else {
            return;
        };
        let (loaded, logs) =
            capture_logs(|| load_font(&system, &[PathBuf::from("/nonexistent/b.ttf")]).unwrap());
        assert!(!loaded.is_fallback);
        assert!(!logs.contains("WARN"), "logs: {logs}");
    }

    #[test]
    fn size_is_em_size() {
        let Some(font) = font() else {
            return;
        };
        let units_per_em = font.units_per_em().unwrap();
        let eight = font.outline(font.glyph_id('8')).unwrap();
        let expected = (eight.bounds.max.y - eight.bounds.min.y) * 40.0 / units_per_em;

        let measured = measure_text(&font, 40.0, "8").unwrap();
        assert!(
            (measured.height() as f32 - expected).abs() <= 2.0,
            "digit height {} at 40px em, expected about {expected}",
            measured.height()
        );
    }

    #[test]
    fn advance_scales_with_em() {
        let Some(font) = font() else {
            return;
        };
        let units_per_em = font.units_per_em().unwrap();
        let advance = font.h_advance_unscaled(font.glyph_id('0')) * 80.0 / units_per_em;

        // Two zeros: the second starts exactly one advance after the first
        let one = measure_text(&font, 80.0, "0").unwrap();
        let two = measure_text(&font, 80.0, "00").unwrap();
        let shift = (two.max_x - one.max_x) as f32;
        assert!((shift - advance).abs() <= 1.5, "shift {shift}, advance {advance}");
    }

    #[test]
    fn measure_blank_text_is_none() {
        let Some(font) = font() else {
            return;
        };
        assert_eq!(measure_text(&font, 40.0, ""), None);
        assert_eq!(measure_text(&font, 40.0, "   "), None);
    }

    #[test]
    fn measure_grows_with_size() {
        let Some(font) = font() else {
            return;
        };
        let small = measure_text(&font, 20.0, "2024-01-01").unwrap();
        let large = measure_text(&font, 80.0, "2024-01-01").unwrap();
        assert!(large.width() > small.width() * 3);
        assert!(large.height() > small.height() * 3);
    }

    #[test]
    fn draw_stays_inside_measured_bounds() {
        let Some(font) = font() else {
            return;
        };
        let text = "2024-01-01";
        let b = measure_text(&font, 24.0, text).unwrap();
        let origin = (5, 5);
        let mut canvas = RgbaImage::new(300, 80);
        draw_text(&mut canvas, &font, 24.0, origin, Rgba([255, 0, 0, 255]), text);

        let mut inked = 0;
        for (x, y, p) in canvas.enumerate_pixels() {
            if p[3] == 0 {
                continue;
            }
            inked += 1;
            let (x, y) = (x as i32, y as i32);
            assert!(x >= origin.0 + b.min_x && x < origin.0 + b.max_x);
            assert!(y >= origin.1 + b.min_y && y < origin.1 + b.max_y);
        }
        assert!(inked > 0);
    }

    #[test]
    fn draw_keeps_straight_colour_on_transparent_layer() {
        let Some(font) = font() else {
            return;
        };
        let mut canvas = RgbaImage::new(200, 60);
        draw_text(&mut canvas, &font, 32.0, (0, 0), Rgba([255, 165, 0, 255]), "8888");

        // Antialiased edge pixels keep the fill colour; only alpha varies
        for p in canvas.pixels().filter(|p| p[3] > 0) {
            assert_eq!((p[0], p[1], p[2]), (255, 165, 0));
        }
    }

    #[test]
    fn blend_over_transparent_keeps_source_colour() {
        let mut dst = Rgba([0, 0, 0, 0]);
        blend_over(&mut dst, Rgba([255, 165, 0, 77]));
        assert_eq!(dst, Rgba([255, 165, 0, 77]));
    }

    #[test]
    fn blend_over_opaque_source_replaces() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_over(&mut dst, Rgba([255, 165, 0, 255]));
        assert_eq!(dst, Rgba([255, 165, 0, 255]));
    }

    #[test]
    fn blend_over_half_on_opaque_mixes() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend_over(&mut dst, Rgba([200, 100, 50, 128]));
        assert_eq!(dst[3], 255);
        assert!((99..=101).contains(&dst[0]));
        assert!((49..=51).contains(&dst[1]));
    }

    #[test]
    fn composite_over_skips_transparent_layer_pixels() {
        let mut base = RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 255]));
        let mut layer = RgbaImage::new(2, 1);
        layer.put_pixel(1, 0, Rgba([255, 165, 0, 255]));

        composite_over(&mut base, &layer);

        assert_eq!(*base.get_pixel(0, 0), Rgba([9, 9, 9, 255]));
        assert_eq!(*base.get_pixel(1, 0), Rgba([255, 165, 0, 255]));
    }

    #[test]
    fn draw_clips_off_canvas() {
        let Some(font) = font() else {
            return;
        };
        let mut canvas = RgbaImage::new(10, 10);
        // Entirely outside: must not panic
        draw_text(&mut canvas, &font, 40.0, (-500, -500), Rgba([0, 0, 0, 255]), "2024");
        draw_text(&mut canvas, &font, 40.0, (500, 500), Rgba([0, 0, 0, 255]), "2024");
        assert!(canvas.pixels().all(|p| p[3] == 0));
    }
}
