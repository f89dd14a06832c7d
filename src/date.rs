//! Photo date resolution.
//!
//! Every photo gets exactly one calendar date. Sources are tried in priority
//! order and the first one that yields a date wins:
//!
//! 1. **EXIF capture time**: `DateTimeOriginal`, then `DateTimeDigitized`.
//!    Read with `kamadak-exif`, which understands JPEG, PNG, TIFF, WebP and
//!    HEIF/HEIC containers.
//! 2. **File creation time**: the filesystem birth time. Where the platform
//!    does not record birth time, the last-modified time stands in.
//! 3. **Today**: the date the run started.
//!
//! Failures along the way are logged and never surface to the caller.
//! Timestamps are not timezone-normalised: EXIF times are taken as written,
//! filesystem times are converted to the local calendar date.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use exif::{In, Tag, Value};
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

/// EXIF tags carrying the capture time, in priority order.
const CAPTURE_TAGS: [Tag; 2] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized];

/// Layout of EXIF date-time values.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum DateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),
    #[error("Unparsable EXIF timestamp: {0:?}")]
    Unparsable(String),
}

/// Where a resolved date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Exif,
    FileCreated,
    FileModified,
    Today,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateSource::Exif => "exif",
            DateSource::FileCreated => "file created",
            DateSource::FileModified => "file modified",
            DateSource::Today => "today",
        })
    }
}

/// A resolved photo date together with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Render a date with a `strftime` pattern.
///
/// Returns `None` when the pattern is malformed or asks for fields a plain
/// date does not have (hours, timezone).
pub fn format_date(date: NaiveDate, pattern: &str) -> Option<String> {
    use std::fmt::Write;
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

/// Resolve the date to stamp on `path`. Never fails: `today` is the last resort.
pub fn resolve_photo_date(path: &Path, today: NaiveDate) -> PhotoDate {
    let name = display_name(path);

    match read_exif_date(path) {
        Ok(Some(date)) => {
            return PhotoDate {
                date,
                source: DateSource::Exif,
            };
        }
        Ok(None) => debug!(file = %name, "no capture date in EXIF"),
        Err(DateError::Exif(exif::Error::NotFound(_))) => {
            debug!(file = %name, "no EXIF data")
        }
        Err(e) => warn!(file = %name, error = %e, "EXIF read failed"),
    }

    match file_date(path) {
        Ok(found) => return found,
        Err(e) => debug!(file = %name, error = %e, "file timestamps unavailable"),
    }

    PhotoDate {
        date: today,
        source: DateSource::Today,
    }
}

/// Read the capture date from embedded EXIF metadata.
///
/// - `Ok(Some(date))`: a capture tag was present and parsed
/// - `Ok(None)`: EXIF exists but has no capture tag
/// - `Err(_)`: unreadable file, no EXIF block, or a malformed timestamp
pub fn read_exif_date(path: &Path) -> Result<Option<NaiveDate>, DateError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader)?;

    let mut unparsable = None;
    for tag in CAPTURE_TAGS {
        let Some(field) = exif.get_field(tag, In::PRIMARY) else {
            continue;
        };
        let Value::Ascii(ref values) = field.value else {
            continue;
        };
        let Some(raw) = values.first() else {
            continue;
        };
        match parse_exif_datetime(raw) {
            Ok(date) => return Ok(Some(date)),
            Err(e) => unparsable = Some(e),
        }
    }

    match unparsable {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` value and keep its date part.
fn parse_exif_datetime(raw: &[u8]) -> Result<NaiveDate, DateError> {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(text, EXIF_DATETIME_FORMAT)
        .map(|dt| dt.date())
        .map_err(|_| DateError::Unparsable(text.to_string()))
}

/// Date from filesystem timestamps: birth time, or modification time where
/// the platform has no birth time.
pub fn file_date(path: &Path) -> std::io::Result<PhotoDate> {
    let meta = fs::metadata(path)?;
    match meta.created() {
        Ok(created) => Ok(PhotoDate {
            date: local_date(created),
            source: DateSource::FileCreated,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::Unsupported => Ok(PhotoDate {
            date: local_date(meta.modified()?),
            source: DateSource::FileModified,
        }),
        Err(e) => Err(e),
    }
}

fn local_date(time: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
