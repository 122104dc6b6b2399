//! Formatting helpers for human-readable file sizes and ages.

use chrono::{DateTime, Utc};

/// Formats a byte count as a human-readable string (B, KB, MB, GB, TB).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Formats the time between `then` and `now` as e.g. "3 days ago".
///
/// Timestamps in the future read as "just now".
#[must_use]
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const UNITS: [(i64, &str); 6] = [
        (365 * 24 * 3600, "year"),
        (30 * 24 * 3600, "month"),
        (7 * 24 * 3600, "week"),
        (24 * 3600, "day"),
        (3600, "hour"),
        (60, "minute"),
    ];

    let secs = (now - then).num_seconds();
    UNITS
        .iter()
        .find(|(unit, _)| secs >= *unit)
        .map_or_else(
            || "just now".to_string(),
            |(unit, name)| {
                let n = secs / unit;
                if n == 1 {
                    format!("1 {name} ago")
                } else {
                    format!("{n} {name}s ago")
                }
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
    }

    #[test]
    fn format_size_zero() {
        assert_eq!(format_size(0), "0 B");
    }

    #[test]
    fn format_age_units() {
        assert_eq!(format_age(now() - Duration::seconds(30), now()), "just now");
        assert_eq!(format_age(now() - Duration::minutes(1), now()), "1 minute ago");
        assert_eq!(format_age(now() - Duration::hours(5), now()), "5 hours ago");
        assert_eq!(format_age(now() - Duration::days(3), now()), "3 days ago");
        assert_eq!(format_age(now() - Duration::days(14), now()), "2 weeks ago");
        assert_eq!(format_age(now() - Duration::days(60), now()), "2 months ago");
        assert_eq!(format_age(now() - Duration::days(800), now()), "2 years ago");
    }

    #[test]
    fn format_age_future_is_just_now() {
        assert_eq!(format_age(now() + Duration::days(1), now()), "just now");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn format_size_never_panics(bytes in 0u64..u64::MAX) {
                let _ = format_size(bytes);
            }

            #[test]
            fn format_age_always_ends_sensibly(secs in -1_000_000i64..1_000_000_000) {
                let s = format_age(now() - Duration::seconds(secs), now());
                prop_assert!(s == "just now" || s.ends_with(" ago"));
            }
        }
    }
}
