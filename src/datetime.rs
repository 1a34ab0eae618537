//! Date/time utilities for gator.
//!
//! Timestamps are stored as RFC 3339 UTC text with a fixed precision, so
//! string order in the database is chronological order on every backend.

use std::fmt::Write;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use chrono_tz::Tz;

/// Format a timestamp for storage.
pub fn to_db(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and the plain `YYYY-MM-DD HH:MM:SS` form.
pub fn from_db(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// Format a DateTime<Utc> in the specified timezone.
///
/// Falls back to UTC when the timezone name is unknown, and to RFC 3339
/// when the format string cannot be rendered.
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    let mut out = String::new();
    let written = match timezone.parse::<Tz>() {
        Ok(tz) => write!(out, "{}", dt.with_timezone(&tz).format(format)),
        Err(_) => write!(out, "{}", dt.format(format)),
    };
    match written {
        Ok(()) => out,
        Err(_) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}
