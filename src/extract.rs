//! Record extraction: turns raw listing entries into browsable file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::RawObject;

/// Key fragment marking packaging-internal index paths that are never listed.
const EXCLUDED_FRAGMENT: &str = "dists/";

/// One downloadable object in the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Full slash-delimited key.
    pub path: String,
    /// Last path segment.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Absolute URL the object can be downloaded from.
    pub download_url: String,
}

/// Returns `true` if `key` names an object that belongs in the listing.
///
/// Keys at the bucket root (no `/`) and anything under a `dists/` directory
/// are left out.
#[must_use]
pub fn is_listed_key(key: &str) -> bool {
    key.contains('/') && !key.contains(EXCLUDED_FRAGMENT)
}

/// Builds the download URL for `key` in `bucket`.
#[must_use]
pub fn download_url(bucket: &str, key: &str) -> String {
    format!("http://{bucket}/{key}")
}

/// Maps raw listing entries to file records, preserving order.
///
/// Entries with an excluded key are dropped silently; entries with a
/// missing or malformed field are dropped with a warning.
#[must_use]
pub fn extract_files(raw: &[RawObject], bucket: &str) -> Vec<FileRecord> {
    let files: Vec<FileRecord> = raw
        .iter()
        .filter_map(|object| match to_record(object, bucket) {
            Ok(record) => record,
            Err(reason) => {
                log::warn!(
                    "Skipping listing entry {:?}: {reason}",
                    object.key.as_deref().unwrap_or("<no key>")
                );
                None
            }
        })
        .collect();

    log::info!("Extracted {} files from {} objects", files.len(), raw.len());
    files
}

/// Converts one entry. `Ok(None)` means the key is intentionally excluded.
fn to_record(object: &RawObject, bucket: &str) -> Result<Option<FileRecord>, String> {
    let key = object.key.as_deref().ok_or("missing Key")?;
    if !is_listed_key(key) {
        return Ok(None);
    }

    let size = object
        .size
        .as_deref()
        .ok_or("missing Size")?
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid Size: {e}"))?;

    let last_modified = object
        .last_modified
        .as_deref()
        .ok_or("missing LastModified")
        .and_then(|ts| {
            DateTime::parse_from_rfc3339(ts.trim()).map_err(|_| "invalid LastModified")
        })?
        .with_timezone(&Utc);

    let name = key.rsplit('/').next().unwrap_or(key).to_string();

    Ok(Some(FileRecord {
        path: key.to_string(),
        name,
        size,
        last_modified,
        download_url: download_url(bucket, key),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(key: &str) -> RawObject {
        RawObject {
            key: Some(key.to_string()),
            size: Some("2048".to_string()),
            last_modified: Some("2019-05-02T12:30:00.000Z".to_string()),
        }
    }

    #[test]
    fn excludes_root_keys_and_dists() {
        let objects: Vec<_> = ["a", "a/b.txt", "dists/x/y.deb", "a/dists/z"]
            .into_iter()
            .map(raw)
            .collect();
        let files = extract_files(&objects, "deb.example.net");
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a/b.txt"]);
    }

    #[test]
    fn derives_name_and_url() {
        let files = extract_files(&[raw("opx/3.0.0/image.bin")], "archive.example.net");
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.path, "opx/3.0.0/image.bin");
        assert_eq!(file.name, "image.bin");
        assert_eq!(file.size, 2048);
        assert_eq!(
            file.download_url,
            "http://archive.example.net/opx/3.0.0/image.bin"
        );
        assert_eq!(
            file.last_modified,
            Utc.with_ymd_and_hms(2019, 5, 2, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn trailing_slash_key_has_empty_name() {
        let files = extract_files(&[raw("folder/")], "b");
        assert_eq!(files[0].name, "");
    }

    #[test]
    fn malformed_records_are_skipped_individually() {
        let mut bad_size = raw("a/bad-size.txt");
        bad_size.size = Some("lots".to_string());
        let mut bad_time = raw("a/bad-time.txt");
        bad_time.last_modified = Some("yesterday".to_string());
        let mut no_size = raw("a/no-size.txt");
        no_size.size = None;
        let no_key = RawObject {
            key: None,
            ..raw("x/y")
        };

        let objects = vec![raw("a/ok-1.txt"), bad_size, bad_time, no_size, no_key, raw("a/ok-2.txt")];
        let files = extract_files(&objects, "b");
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a/ok-1.txt", "a/ok-2.txt"]);
    }

    #[test]
    fn listed_key_rules() {
        assert!(is_listed_key("a/b"));
        assert!(!is_listed_key("readme"));
        assert!(!is_listed_key("pool/dists/main"));
        assert!(is_listed_key("pool/distsx/main"));
    }

    #[test]
    fn preserves_input_order() {
        let objects: Vec<_> = ["z/1", "a/2", "m/3"].into_iter().map(raw).collect();
        let files = extract_files(&objects, "b");
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3"]);
    }
}
