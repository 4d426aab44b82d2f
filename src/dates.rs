//! Normalization of publication timestamps.
//!
//! Feeds and NewsAPI hand back dates in whatever shape the publisher chose:
//! RFC 2822 (`Sat, 18 Oct 2025 10:30:00 +0530`), ISO-8601 with or without an
//! offset, or looser textual forms. Everything is reduced to a single
//! `DD/MM/YY HH:MM` display string using the wall-clock time as written; no
//! timezone conversion happens.
//!
//! [`parse_date`] is the fallible core. [`normalize`] and [`normalize_opt`]
//! wrap it and never fail: anything unparseable becomes
//! [`INVALID_DATE_FORMAT`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::trace;

/// Marker used when an entry carries no publication date at all.
pub const NO_DATE_AVAILABLE: &str = "No date available";

/// Returned for any date string that cannot be parsed.
pub const INVALID_DATE_FORMAT: &str = "Invalid date format";

/// Display format for every normalized date.
pub const DISPLAY_FORMAT: &str = "%d/%m/%y %H:%M";

/// Formats carrying an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M %z",
    "%A, %d %B %Y %H:%M:%S %z",
    "%A, %d %B %Y %H:%M %z",
    "%d %B %Y %H:%M:%S %z",
    "%d %B %Y %H:%M %z",
];

/// Numeric dates are read month-first; the day-first entries only match when
/// the first field cannot be a month.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%A, %d %B %Y %H:%M:%S",
    "%A, %d %B %Y %H:%M",
    // RFC 850, once the zone is dropped
    "%A, %d-%B-%y %H:%M:%S",
    // asctime
    "%a %B %e %H:%M:%S %Y",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%A, %B %d, %Y %I:%M %p",
    "%A, %B %d, %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m-%d-%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

const DATE_ONLY_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%A, %d %B %Y",
    "%A, %B %d, %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
];

/// Trailing zone abbreviation such as `IST` or `(PDT)` after a time.
static TRAILING_ZONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<rest>.*\d)\s*\(?(?P<zone>[A-Za-z]{2,5})\)?$").expect("static regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("empty date string")]
    Empty,
    #[error("unrecognized date format: {0:?}")]
    Unrecognized(String),
}

/// Parse `raw` into the wall-clock time it describes.
///
/// Offsets are honoured only to the extent of being accepted; the returned
/// value is the local time as written in the source string.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime, DateParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Some(parsed) = parse_known(trimmed) {
        return Ok(parsed);
    }

    // Zone names like IST or CEST are ambiguous, drop them and read the rest
    // as local time.
    if let Some(caps) = TRAILING_ZONE.captures(trimmed) {
        let zone = caps["zone"].to_ascii_uppercase();
        if zone != "AM" && zone != "PM" {
            if let Some(parsed) = parse_known(caps["rest"].trim_end()) {
                trace!(raw, %zone, "Ignored trailing zone abbreviation");
                return Ok(parsed);
            }
        }
    }

    Err(DateParseError::Unrecognized(trimmed.to_string()))
}

fn parse_known(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    // `%z` does not accept a bare `Z`.
    let zulu;
    let with_offset = match s.strip_suffix('Z') {
        Some(head) => {
            zulu = format!("{head}+0000");
            zulu.as_str()
        }
        None => s,
    };
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(with_offset, fmt) {
            return Some(dt.naive_local());
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DATE_ONLY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Normalize a date string to `DD/MM/YY HH:MM`.
///
/// [`NO_DATE_AVAILABLE`] is passed through untouched. Anything that fails to
/// parse, including the empty string, yields [`INVALID_DATE_FORMAT`].
pub fn normalize(raw: &str) -> String {
    if raw == NO_DATE_AVAILABLE {
        return NO_DATE_AVAILABLE.to_string();
    }
    match parse_date(raw) {
        Ok(parsed) => parsed.format(DISPLAY_FORMAT).to_string(),
        Err(e) => {
            trace!(error = %e, "Date normalization failed");
            INVALID_DATE_FORMAT.to_string()
        }
    }
}

/// Like [`normalize`], treating an absent value as unparseable.
pub fn normalize_opt(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => normalize(raw),
        None => INVALID_DATE_FORMAT.to_string(),
    }
}

/// True when `s` looks like a normalized `DD/MM/YY HH:MM` string.
#[cfg(test)]
pub fn is_display_format(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, DISPLAY_FORMAT).is_ok() && s.len() == 14
}
