use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, VizError};

/// Day-first formats seen in bank exports, with and without a time part.
const DAY_FIRST: &[&str] = &["%d %b %Y %H:%M:%S", "%d %b %Y", "%d/%m/%Y"];

/// Year-first fallbacks.
const YEAR_FIRST: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y %b %d %H:%M:%S",
    "%Y-%b-%d",
    "%Y-%m-%d",
];

fn try_format(raw: &str, fmt: &str) -> Option<NaiveDate> {
    if fmt.contains("%H") {
        NaiveDateTime::parse_from_str(raw, fmt).ok().map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(raw, fmt).ok()
    }
}

/// Parse a display-formatted date into a calendar date.
///
/// Formats are tried in a fixed order and the first one that parses wins, so an
/// ambiguous `01/02/2025` is always read day-first. Any time of day is dropped.
pub fn normalize_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    DAY_FIRST
        .iter()
        .chain(YEAR_FIRST)
        .find_map(|fmt| try_format(raw, fmt))
        .ok_or_else(|| VizError::InvalidDate(raw.to_string()))
}
