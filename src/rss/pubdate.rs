//! Publication date normalization.
//!
//! Feed dates are free text from untrusted XML. A fixed, ordered list of
//! parsers is tried and the first success wins. When all of them fail the
//! current time is used so a single bad date never stops ingestion.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

/// A single date format attempt.
type DateParser = fn(&str) -> Option<DateTime<Utc>>;

/// Supported formats, in the order they are tried.
const PARSERS: &[(&str, DateParser)] = &[
    ("RFC 1123 (numeric zone)", parse_rfc1123_numeric_zone),
    ("RFC 1123 (named zone)", parse_rfc1123_named_zone),
    ("RFC 822", parse_rfc822),
    ("ISO 8601 UTC", parse_iso8601_utc),
];

/// Parse a publication date with the supported formats.
///
/// Returns `None` when no format matches.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    PARSERS.iter().find_map(|(_, parse)| parse(raw))
}

/// Normalize a publication date, falling back to now.
pub fn normalize_pub_date(raw: &str) -> DateTime<Utc> {
    match parse_pub_date(raw) {
        Some(dt) => dt,
        None => {
            warn!(date = raw, "Could not parse publication date, using current time");
            Utc::now()
        }
    }
}

/// Abbreviated day names accepted in front of RFC 1123 dates.
const WEEKDAYS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// `Mon, 02 Jan 2006 15:04:05 -0700`
fn parse_rfc1123_numeric_zone(s: &str) -> Option<DateTime<Utc>> {
    let s = strip_weekday(s)?;
    DateTime::parse_from_str(s, "%d %b %Y %H:%M:%S%.f %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `Mon, 02 Jan 2006 15:04:05 MST`
fn parse_rfc1123_named_zone(s: &str) -> Option<DateTime<Utc>> {
    let (datetime, zone) = split_zone(strip_weekday(s)?)?;
    let naive = NaiveDateTime::parse_from_str(datetime, "%d %b %Y %H:%M:%S%.f").ok()?;
    localize(naive, zone_offset(zone)?)
}

/// `02 Jan 06 15:04 MST`
fn parse_rfc822(s: &str) -> Option<DateTime<Utc>> {
    let (datetime, zone) = split_zone(s)?;
    let naive = NaiveDateTime::parse_from_str(datetime, "%d %b %y %H:%M").ok()?;
    localize(naive, zone_offset(zone)?)
}

/// `2006-01-02T15:04:05Z`, optionally with fractional seconds.
fn parse_iso8601_utc(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Drop a leading `"<Day>, "`.
///
/// The day must be a known abbreviation but need not agree with the date;
/// feeds frequently get it wrong.
fn strip_weekday(s: &str) -> Option<&str> {
    let (day, rest) = s.split_once(',')?;
    WEEKDAYS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(day.trim()))
        .then_some(rest.trim_start())
}

/// Split `"<datetime> <ZONE>"` at the last space.
fn split_zone(s: &str) -> Option<(&str, &str)> {
    let (datetime, zone) = s.rsplit_once(' ')?;
    Some((datetime.trim_end(), zone))
}

/// Resolve a zone abbreviation to an offset.
///
/// Unknown alphabetic abbreviations are read as UTC; anything else
/// (numeric offsets, garbage) is rejected so another parser can try.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let hours = match zone.to_ascii_uppercase().as_str() {
        "UT" | "UTC" | "GMT" | "Z" => 0,
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}

fn localize(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
