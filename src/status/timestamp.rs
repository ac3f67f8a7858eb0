//! Normalises `created_at` values into Unix epoch seconds.
//!
//! The order store hands back whatever representation the column type
//! renders to, so several shapes are accepted:
//! - RFC 3339 / ISO 8601 with `T` or space separator and a `Z` or numeric offset
//! - naive date-times (treated as UTC)
//! - bare dates (midnight UTC)
//! - integer epoch seconds

use crate::error::TimestampParseError;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string into epoch seconds
pub fn normalize_timestamp(raw: &str) -> Result<i64, TimestampParseError> {
    let value = raw.trim();

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        // Only epochs chrono can represent; keeps window arithmetic in range
        return value
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| dt.timestamp())
            .ok_or_else(|| parse_error(raw));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }

    // `Z` suffix on a space-separated value is not RFC 3339 but is common
    let zulu = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .map(|v| format!("{v}+00:00"));
    let candidate = zulu.as_deref().unwrap_or(value);

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(candidate, format) {
            return Ok(dt.timestamp());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc().timestamp());
        }
    }

    Err(parse_error(raw))
}

fn parse_error(raw: &str) -> TimestampParseError {
    TimestampParseError {
        value: raw.to_string(),
    }
}
