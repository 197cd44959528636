//! Publish-date normalization.
//!
//! Feeds disagree on date formats. Every date is reduced to a calendar day
//! (as written in the source's own offset) and anything unreadable falls back
//! to the run date, which keeps such entries inside the recency window.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

/// Offset-aware formats tried after RFC 2822 and RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Offset-less date-time formats.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Plain calendar date.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a raw feed timestamp into the wall-clock time written in the string.
///
/// The offset is dropped, not applied: `Tue, 31 Dec 2024 20:00:00 -0500` is
/// 2024-12-31 20:00. Order: RFC 822/2822, ISO 8601 with offset (RFC 3339
/// first), ISO 8601 without offset, plain ISO date (at midnight).
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a raw feed date into the calendar day in the source's own offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_local_datetime(raw).map(|dt| dt.date())
}

/// Normalize a raw feed date, falling back to `today` when it is missing or unreadable.
pub fn normalize_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    match raw.and_then(parse_date) {
        Some(date) => date,
        None => {
            debug!(raw = raw.unwrap_or(""), %today, "unparseable date, using run date");
            today
        }
    }
}

/// Whether a normalized date is on or after the monitoring cutoff.
pub fn is_recent_enough(date: NaiveDate, cutoff: NaiveDate) -> bool {
    date >= cutoff
}
