//! Derived, read-only views over the flat file list.

use chrono::{DateTime, TimeDelta, Utc};

use crate::extract::FileRecord;

/// Returns the files whose path contains `query`, ignoring case.
///
/// An empty query means search is inactive and matches nothing.
#[must_use]
pub fn search<'a>(files: &'a [FileRecord], query: &str) -> Vec<&'a FileRecord> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    files
        .iter()
        .filter(|f| f.path.to_lowercase().contains(&needle))
        .collect()
}

/// Returns the files modified strictly after `window_start`, newest first.
#[must_use]
pub fn recent(files: &[FileRecord], window_start: DateTime<Utc>) -> Vec<&FileRecord> {
    let mut recent: Vec<_> = files
        .iter()
        .filter(|f| f.last_modified > window_start)
        .collect();
    recent.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    recent
}

/// Start of a recency window reaching `days` back from `now`.
///
/// Returns `None` if the window reaches outside the representable date range.
#[must_use]
pub fn window_start(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days).and_then(|window| now.checked_sub_signed(window))
}
