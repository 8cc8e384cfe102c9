//! Rescan scheduling.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::domain::PropertyMap;
use crate::properties::TESTING_MARKER;

/// Decide whether a repository is due for a scan.
///
/// - never scanned (absent or empty value): scan
/// - value `"Testing"`: scan
/// - timestamp older than `days_threshold` days: scan
/// - timestamp within the threshold: skip
/// - unparseable timestamp: scan
pub fn should_scan(
    properties: &PropertyMap,
    timestamp_property: &str,
    days_threshold: i64,
    now: DateTime<Utc>,
) -> bool {
    let Some(last_scanned) = properties
        .get(timestamp_property)
        .filter(|value| !value.is_empty())
    else {
        tracing::info!("Repository has never been scanned");
        return true;
    };

    if last_scanned == TESTING_MARKER {
        tracing::info!("Repository is marked for testing");
        return true;
    }

    let Some(scanned_at) = parse_timestamp(last_scanned) else {
        tracing::warn!(value = %last_scanned, "Invalid timestamp format, scanning");
        return true;
    };

    if now - scanned_at > TimeDelta::days(days_threshold) {
        tracing::info!(days = days_threshold, "Last scan is older than threshold");
        true
    } else {
        tracing::info!(days = days_threshold, "Scanned within threshold, skipping");
        false
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 date-time or date
/// (interpreted as UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
