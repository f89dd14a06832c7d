//! Image processing: decode, stamp text, encode PNG.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Decode HEIC** | `libheif-rs` (optional `heic` feature) |
//! | **Text** | `ab_glyph` outlines, straight-alpha coverage blending |
//! | **Encode** | PNG via the `image` crate |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for font size, inset and placement (unit testable)
//! - **Parameters**: Data structures describing a stamp
//! - **Text**: Font loading, measuring and rasterising
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod text;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{TextBounds, calculate_font_size, calculate_padding};
pub use rust_backend::RustBackend;
// Re-exported for tests (process.rs, operations.rs tests use this)
#[cfg(test)]
pub use backend::Dimensions;
pub use operations::{StampedImage, TextLayout, get_dimensions, plan_stamp, stamp_date};
pub use params::{StampParams, TextStyle};
pub use text::{FontError, LoadedFont, load_font};
