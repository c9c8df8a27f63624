//! Date-aware ordering for place records.
//!
//! Dates are kept as written for display; ordering parses them into calendar
//! dates so `2024-1-9` and `2024-01-10` compare by value rather than by
//! spelling.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%d %B %Y", "%b %d, %Y"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a display date into a calendar date.
///
/// Accepts ISO dates with or without zero padding, slash-separated dates,
/// RFC 3339 timestamps and long-form English dates such as `May 1, 2023`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|stamp| stamp.date())
        })
}

/// Order two parsed dates most recent first, with unparseable dates last.
pub(crate) fn newest_first(lhs: Option<NaiveDate>, rhs: Option<NaiveDate>) -> Ordering {
    match (lhs, rhs) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
