//! Timestamp parsing for event streams

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Naive formats, all interpreted as UTC
const NAIVE_FORMATS: &[&str] = &[
    // "2023-10-06 09:30:21.890421"
    "%F %T%.f",
    // "2024-10-02T07:55:15.348555" and "2022-01-09T15:00:00"
    "%FT%T%.f",
    "%FT%T",
    "%F %T UTC",
];

/// Parse a timestamp string to [`DateTime<FixedOffset>`], trying multiple formats.
///
/// Supported formats (in order of precedence):
/// 1. RFC3339: `2023-10-06T09:30:21+00:00`
/// 2. ISO 8601 with offset (no colon): `2023-10-06T09:30:21+0000`
/// 3. RFC2822: `Fri, 06 Oct 2023 09:30:21 +0000`
/// 4. Naive datetimes (see `NAIVE_FORMATS`, assumes UTC)
pub fn parse_timestamp(time: &str) -> Result<DateTime<FixedOffset>, &str> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(time) {
        return Ok(dt);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(time, format).ok())
        .map(|dt| dt.and_utc().into())
        .ok_or_else(|| {
            tracing::debug!(time, "failed to parse timestamp");
            time
        })
}

/// Parse a timestamp string to milliseconds since the UNIX epoch
///
/// This is the scalar representation used by [`crate::FlatEvent::timestamp`].
pub fn parse_timestamp_millis(time: &str) -> Result<i64, String> {
    parse_timestamp(time)
        .map(|dt| dt.timestamp_millis())
        .map_err(|t| format!("Unexpected timestamp format: '{t}'"))
}
