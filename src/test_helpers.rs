//! Shared test utilities for the datestamp test suite.
//!
//! Provides synthetic image writers (plain, EXIF-tagged, corrupt), a
//! system-font lookup for tests that rasterise real text, and a log capture
//! for asserting `tracing` output.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let photo = tmp.path().join("photo.jpg");
//! write_jpeg_with_exif(&photo, 64, 48, TAG_DATE_TIME_ORIGINAL, "2019:07:14 09:30:00");
//! ```

use image::{ImageEncoder, RgbImage};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// EXIF `DateTimeOriginal` tag number.
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
/// EXIF `DateTimeDigitized` tag number.
pub const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;

/// Gradient test pattern so encoders have something non-trivial to chew on.
fn pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a small JPEG into memory.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = pattern(width, height);
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// Write a small valid JPEG file with no metadata.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Write a solid-colour PNG file.
pub fn write_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    RgbImage::from_pixel(width, height, image::Rgb(rgb))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a file with an image extension but garbage content.
pub fn write_corrupt(path: &Path) {
    std::fs::write(path, b"this is not an image at all").unwrap();
}

/// Write a JPEG carrying a single EXIF ASCII date tag in its Exif sub-IFD.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, tag: u16, value: &str) {
    let jpeg = jpeg_bytes(width, height);
    let app1 = exif_app1_segment(tag, value);

    // Splice APP1 right after SOI (FF D8)
    let mut out = Vec::with_capacity(jpeg.len() + app1.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

/// Build a JPEG APP1 segment holding a minimal little-endian TIFF structure:
/// IFD0 with an Exif IFD pointer, and an Exif IFD with one ASCII field.
fn exif_app1_segment(tag: u16, value: &str) -> Vec<u8> {
    const IFD0_OFFSET: u32 = 8;
    const EXIF_IFD_OFFSET: u32 = IFD0_OFFSET + 2 + 12 + 4;
    const DATA_OFFSET: u32 = EXIF_IFD_OFFSET + 2 + 12 + 4;

    let mut ascii = value.as_bytes().to_vec();
    ascii.push(0);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&IFD0_OFFSET.to_le_bytes());

    // IFD0: ExifIFDPointer (0x8769, LONG)
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&EXIF_IFD_OFFSET.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    // Exif IFD: the date tag (ASCII), value stored out of line
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&tag.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&DATA_OFFSET.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    assert_eq!(tiff.len() as u32, DATA_OFFSET);
    tiff.extend_from_slice(&ascii);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);
    segment
}

/// First installed font from the stock fallback list, if any.
///
/// Tests that rasterise text return early when this is `None`.
pub fn system_font() -> Option<PathBuf> {
    crate::config::StampConfig::default()
        .fallback_fonts
        .into_iter()
        .find(|p| p.is_absolute() && crate::imaging::text::load_font_file(p).is_ok())
}

/// In-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber recording every event down to
/// `DEBUG`, and return its result with the formatted log text.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
