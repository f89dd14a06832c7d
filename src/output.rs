//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Stamp
//!
//! One status line per image, then a summary:
//!
//! ```text
//! failed: broken.jpg - Processing failed: Failed to decode broken.jpg: ...
//! stamped: IMG_0412.jpg → IMG_0412_dated.png (2023-07-04, exif)
//! stamped: scan.png → scan_dated.png (2024-02-11, file created)
//! skipped: IMG_0399_dated.png
//!
//! Stamped 2, failed 1, skipped 1
//! ```
//!
//! ## Check
//!
//! ```text
//! IMG_0412.jpg: 2023-07-04 (exif)
//! scan.png: 2024-02-11 (file created)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `String` or `Vec<String>`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! These lines are the user-facing report and always go to stdout;
//! diagnostics go through `tracing` on stderr.

use crate::process::{CheckEntry, RunSummary, StampEvent};
use std::path::Path;

/// File name for display, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Stamp output
// ============================================================================

/// Format a single stamp progress event as a status line.
pub fn format_stamp_event(event: &StampEvent) -> String {
    match event {
        StampEvent::Stamped {
            source,
            output,
            date,
            date_source,
        } => format!(
            "stamped: {} → {} ({}, {})",
            display_name(source),
            display_name(output),
            date,
            date_source
        ),
        StampEvent::Failed { source, error } => {
            format!("failed: {} - {}", display_name(source), error)
        }
        StampEvent::Skipped { source } => format!("skipped: {}", display_name(source)),
    }
}

/// Print a stamp progress event to stdout.
pub fn print_stamp_event(event: &StampEvent) {
    println!("{}", format_stamp_event(event));
}

/// Format the end-of-run summary line.
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Stamped {}, failed {}, skipped {}",
        summary.stamped, summary.failed, summary.skipped
    )
}

/// Print the end-of-run summary, separated from the status lines by a blank line.
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", format_summary(summary));
}

// ============================================================================
// Check output
// ============================================================================

/// Format dry-run results, one line per image.
pub fn format_check_output(entries: &[CheckEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| format!("{}: {} ({})", display_name(&e.source), e.date, e.date_source))
        .collect()
}

/// Print dry-run results to stdout.
pub fn print_check_output(entries: &[CheckEntry]) {
    for line in format_check_output(entries) {
        println!("{}", line);
    }
}
