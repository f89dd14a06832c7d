//! # datestamp
//!
//! Burns the date a photo was taken into its bottom-right corner, the way a
//! film camera's date back used to. Point it at a directory; every PNG,
//! JPEG and HEIC inside gets a sibling `<name>_dated.png`. Originals are
//! never modified.
//!
//! # Pipeline
//!
//! Each image goes through four steps, independently of every other image:
//!
//! ```text
//! 1. Date       EXIF capture time → file creation time → today
//! 2. Size       font scales with the shorter side (40px at 1080px)
//! 3. Render     orange text, 1px black outline, inset 2% from the corner
//! 4. Save       composited over the original, written as PNG
//! ```
//!
//! A file that cannot be decoded or written is reported and skipped; the
//! rest of the directory is still processed.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists the images directly inside a directory |
//! | [`date`] | Resolves a photo's date through the EXIF → filesystem → today chain |
//! | [`imaging`] | Font loading, text measuring and rendering, PNG output |
//! | [`naming`] | The `<stem>_dated.png` output naming convention |
//! | [`process`] | The per-directory run loop with per-file error isolation |
//! | [`output`] | CLI status lines and summary |
//! | [`config`] | Stock defaults, optional TOML overlay, validation |
//!
//! # Design Decisions
//!
//! ## Always PNG
//!
//! Output is lossless whatever the input. Re-encoding a JPEG would add a
//! second generation of compression artefacts on top of the stamp, and PNG
//! keeps the thin outline crisp.
//!
//! ## Scale by the Shorter Side
//!
//! Font size and inset follow the shorter image side, so a portrait and a
//! landscape shot from the same camera get the same stamp.
//!
//! ## One Trait, One Seam
//!
//! All pixel work sits behind [`imaging::ImageBackend`]. The run loop is
//! tested against a recording mock, without fonts or real images.

pub mod config;
pub mod date;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
