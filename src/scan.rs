//! Directory scanning.
//!
//! Lists the images directly inside one directory (no recursion), in file
//! name order. An entry counts as an image when it is a regular file (or a
//! symlink to one) with a `png`, `jpg`, `jpeg` or `heic` extension, compared
//! case-insensitively. Hidden dotfiles are ignored.
//!
//! Failing to read the directory is the one error that ends a run: there is
//! nothing to stamp without a listing.

use crate::naming;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted as input, lower-case.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "heic"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Result of scanning one directory.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Images to stamp, sorted by file name.
    pub images: Vec<PathBuf>,
    /// Images left alone because they are outputs of an earlier run.
    pub skipped: Vec<PathBuf>,
}

/// List the images in `dir`.
///
/// With `skip_stamped`, files whose stem already ends in `suffix` go to
/// [`ScanResult::skipped`] instead of [`ScanResult::images`].
pub fn scan(dir: &Path, suffix: &str, skip_stamped: bool) -> Result<ScanResult, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let read_err = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(read_err)?;
    entries.sort();

    let mut result = ScanResult::default();
    for path in entries.into_iter().filter(|p| is_image(p)) {
        if skip_stamped && naming::is_stamped(&path, suffix) {
            result.skipped.push(path);
        } else {
            result.images.push(path);
        }
    }
    Ok(result)
}

fn is_image(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'));
    if hidden || !path.is_file() {
        return false;
    }
    has_image_extension(path)
}

/// Case-insensitive extension check against [`IMAGE_EXTENSIONS`].
pub fn has_image_extension(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}
