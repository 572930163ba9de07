//! File name generation for artifacts and containers

use chrono::{DateTime, Local};

/// Maximum length of the label embedded in batch archive names
pub const MAX_LABEL_CHARS: usize = 20;

/// Label used when no usable Start/Resume comment is available
pub const DEFAULT_LABEL: &str = "capture";

/// Sanitize free text for use in a file name
///
/// - Spaces become underscores, slashes become hyphens
/// - Anything that is not alphanumeric, `_` or `-` is dropped
pub fn sanitize_label(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' => '-',
            c => c,
        })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Label for a batch archive, derived from the most recent Start/Resume comment
pub fn batch_label(comment: Option<&str>) -> String {
    let label: String = comment
        .map(sanitize_label)
        .unwrap_or_default()
        .chars()
        .take(MAX_LABEL_CHARS)
        .collect();
    if label.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        label
    }
}

/// `YYYY-MM-DD-HHMM-HHMM` for a capture window
pub fn window_stamp(start: DateTime<Local>, end: DateTime<Local>) -> String {
    format!("{}-{}", start.format("%Y-%m-%d-%H%M"), end.format("%H%M"))
}

/// File stem (no extension) of a batch archive
pub fn batch_archive_stem(start: DateTime<Local>, end: DateTime<Local>, label: &str) -> String {
    format!("{}_{}", window_stamp(start, end), label)
}

/// File stem (no extension) of a master bundle
pub fn master_bundle_stem(
    start: DateTime<Local>,
    end: DateTime<Local>,
    description: &str,
) -> String {
    let desc = sanitize_label(description.trim());
    if desc.is_empty() {
        format!("MASTER_{}", window_stamp(start, end))
    } else {
        format!("MASTER_{}_{}", desc, window_stamp(start, end))
    }
}

/// File name of a single capture, unique to the microsecond
pub fn artifact_file_name(at: DateTime<Local>, extension: &str) -> String {
    format!("ss_{}.{}", at.format("%Y%m%d_%H%M%S_%6f"), extension)
}
