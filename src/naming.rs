//! Output filename convention.
//!
//! A stamped copy lives next to its original and is always a PNG:
//! `photo.jpg` → `photo_dated.png`, `IMG_0042.HEIC` → `IMG_0042_dated.png`.
//! Only the last extension is replaced, so `archive.v2.jpeg` becomes
//! `archive.v2_dated.png`.

use std::path::{Path, PathBuf};

/// Extension of every stamped output.
pub const OUTPUT_EXTENSION: &str = "png";

/// Path of the stamped copy of `source`, in the same directory.
pub fn stamped_output_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{suffix}.{OUTPUT_EXTENSION}"))
}

/// Whether `path` looks like an output of a previous run.
pub fn is_stamped(path: &Path, suffix: &str) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(suffix))
}
