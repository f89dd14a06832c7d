//! Pure calculation functions for stamp sizing and placement.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the font size for an image, scaled by its shorter side.
///
/// The font is `base_font_size` when the shorter side equals `base_size`
/// and scales linearly from there, truncated toward zero. A result of zero
/// is raised to 1 so tiny images still get a (tiny) stamp.
///
/// # Examples
/// ```
/// # use datestamp::imaging::calculate_font_size;
/// assert_eq!(calculate_font_size(1920, 1080, 1080, 40), 40);
/// assert_eq!(calculate_font_size(3840, 2160, 1080, 40), 80);
/// ```
pub fn calculate_font_size(width: u32, height: u32, base_size: u32, base_font_size: u32) -> u32 {
    let shorter_side = width.min(height);
    let size = base_font_size as f64 * (shorter_side as f64 / base_size as f64);
    (size as u32).max(1)
}

/// Calculate the corner inset as a fraction of the shorter side, truncated.
pub fn calculate_padding(width: u32, height: u32, ratio: f64) -> u32 {
    (width.min(height) as f64 * ratio) as u32
}

/// Ink bounds of laid-out text, relative to the pen origin (the top-left of
/// the text's line box). Coordinates are whole pixels; `max` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TextBounds {
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y).max(0) as u32
    }

    /// Smallest bounds containing both `self` and `other`.
    pub fn union(self, other: TextBounds) -> TextBounds {
        TextBounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Calculate the pen origin that puts the ink's bottom-right corner exactly
/// `padding` pixels in from the image's bottom-right corner.
///
/// The origin may be negative when the text is wider or taller than the
/// image; the renderer clips.
pub fn calculate_text_origin(image: (u32, u32), bounds: &TextBounds, padding: u32) -> (i32, i32) {
    let (width, height) = image;
    let x = width as i64 - padding as i64 - bounds.max_x as i64;
    let y = height as i64 - padding as i64 - bounds.max_y as i64;
    (clamp_i32(x), clamp_i32(y))
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
