//! Absolute-date recognition.
//!
//! Rules are tried in order and the first match wins:
//! 1. RFC 2822 (`Tue, 5 Mar 2024 10:15:00 +0200`)
//! 2. ISO 8601, extended and basic forms (`2024-03-05T10:15:00+02:00`,
//!    `2024-065`, `2024-W10-2`, `20240305T101500Z`, ...)
//! 3. `YYYY-MM-DD HH:mm`
//!
//! Matching is strict: the whole input must match and every component is
//! range-checked, so `2024-02-30` is rejected rather than rolled over.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::types::{AbsoluteFormat, Instant};

/// A recognized absolute date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteDate {
    /// Wall-clock components exactly as written.
    pub instant: Instant,
    /// UTC offset, if the input carried one. Never applied to `instant`.
    pub offset: Option<FixedOffset>,
    pub format: AbsoluteFormat,
}

fn patterns() -> &'static IsoPatterns {
    static PATTERNS: OnceLock<IsoPatterns> = OnceLock::new();
    PATTERNS.get_or_init(IsoPatterns::new)
}

struct IsoPatterns {
    extended: Regex,
    basic: Regex,
    custom: Regex,
}

impl IsoPatterns {
    fn new() -> Self {
        Self {
            // 2024-03-05, 2024-03, 2024-065, 2024-W10, 2024-W10-2, optionally
            // followed by T or space, HH[:mm[:ss[.fff]]] and a zone
            extended: Regex::new(
                r"^(?P<date>(?:[+-][0-9]{6}|[0-9]{4})-(?:[0-9]{2}-[0-9]{2}|W[0-9]{2}-[0-9]|W[0-9]{2}|[0-9]{3}|[0-9]{2}))(?:[T ](?P<time>[0-9]{2}(?::[0-9]{2}(?::[0-9]{2}(?:[.,][0-9]+)?)?)?)(?P<zone>Z|[+-][0-9]{2}(?::?[0-9]{2})?)?)?$",
            )
            .unwrap(),
            // 20240305, 2024065, 2024W102, 2024W10, 2024, with HHmmss; no YYYYMM
            basic: Regex::new(
                r"^(?P<date>(?:[+-][0-9]{6}|[0-9]{4})(?:[0-9]{4}|W[0-9]{3}|W[0-9]{2}|[0-9]{3})?)(?:[T ](?P<time>[0-9]{2}(?:[0-9]{2}(?:[0-9]{2}(?:[.,][0-9]+)?)?)?)(?P<zone>Z|[+-][0-9]{2}(?::?[0-9]{2})?)?)?$",
            )
            .unwrap(),
            custom: Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$").unwrap(),
        }
    }
}

/// Recognize `input` as an absolute date.
#[must_use]
pub fn parse_absolute(input: &str) -> Option<AbsoluteDate> {
    let parsed = parse_rfc2822(input)
        .or_else(|| parse_iso8601(input))
        .or_else(|| parse_custom(input));
    match &parsed {
        Some(date) => debug!(input, format = %date.format, instant = %date.instant, "Recognized absolute date"),
        None => trace!(input, "Not an absolute date"),
    }
    parsed
}

/// Whether `input` is accepted by any absolute-date rule.
#[must_use]
pub fn is_valid_date(input: &str) -> bool {
    parse_absolute(input).is_some()
}

/// RFC 2822, as implemented by chrono.
#[must_use]
pub fn parse_rfc2822(input: &str) -> Option<AbsoluteDate> {
    let dt = DateTime::parse_from_rfc2822(input).ok()?;
    Some(AbsoluteDate {
        instant: dt.naive_local(),
        offset: Some(*dt.offset()),
        format: AbsoluteFormat::Rfc2822,
    })
}

/// ISO 8601 in extended (`2024-03-05T10:15`) or basic (`20240305T1015`) form.
#[must_use]
pub fn parse_iso8601(input: &str) -> Option<AbsoluteDate> {
    let patterns = patterns();
    let caps = patterns
        .extended
        .captures(input)
        .or_else(|| patterns.basic.captures(input))?;
    iso_from_captures(&caps)
}

fn iso_from_captures(caps: &Captures<'_>) -> Option<AbsoluteDate> {
    let (date, allows_time) = iso_date(&caps["date"])?;

    let time = match caps.name("time") {
        Some(time) if !allows_time => {
            trace!(time = time.as_str(), "Reduced-precision ISO date cannot carry a time");
            return None;
        }
        Some(time) => iso_time(time.as_str())?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };

    let offset = match caps.name("zone") {
        Some(zone) => Some(iso_zone(zone.as_str())?),
        None => None,
    };

    Some(AbsoluteDate {
        instant: NaiveDateTime::new(date, time),
        offset,
        format: AbsoluteFormat::Iso8601,
    })
}

/// Parse the date part. The flag is false for reduced-precision forms
/// (year only, year-month, week without day) which may not carry a time.
fn iso_date(text: &str) -> Option<(NaiveDate, bool)> {
    let year_len = if text.starts_with(['+', '-']) { 7 } else { 4 };
    let year: i32 = text.get(..year_len)?.parse().ok()?;
    // Must fit the four-digit wire format
    if !(0..=9999).contains(&year) {
        trace!(year, "ISO year outside 0000-9999");
        return None;
    }
    let rest: String = text.get(year_len..)?.chars().filter(|&c| c != '-').collect();

    if let Some(week) = rest.strip_prefix('W') {
        let number: u32 = week.get(..2)?.parse().ok()?;
        return match week.get(2..) {
            Some("") => Some((NaiveDate::from_isoywd_opt(year, number, Weekday::Mon)?, false)),
            Some(day) => {
                let day = iso_weekday(day.parse().ok()?)?;
                Some((NaiveDate::from_isoywd_opt(year, number, day)?, true))
            }
            None => None,
        };
    }

    match rest.len() {
        0 => Some((NaiveDate::from_ymd_opt(year, 1, 1)?, false)),
        2 => Some((NaiveDate::from_ymd_opt(year, rest.parse().ok()?, 1)?, false)),
        3 => Some((NaiveDate::from_yo_opt(year, rest.parse().ok()?)?, true)),
        4 => {
            let month = rest.get(..2)?.parse().ok()?;
            let day = rest.get(2..)?.parse().ok()?;
            Some((NaiveDate::from_ymd_opt(year, month, day)?, true))
        }
        _ => None,
    }
}

fn iso_weekday(day: u32) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

fn iso_time(text: &str) -> Option<NaiveTime> {
    let (clock, fraction) = match text.find(['.', ',']) {
        Some(pos) => (text.get(..pos)?, text.get(pos + 1..)?),
        None => (text, ""),
    };
    let digits: String = clock.chars().filter(|&c| c != ':').collect();

    let hour = digits.get(0..2)?.parse().ok()?;
    let minute = optional_pair(&digits, 2)?;
    let second = optional_pair(&digits, 4)?;

    // Nanosecond precision; extra digits are dropped
    let nanos = if fraction.is_empty() {
        0
    } else {
        let padded: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
        padded.parse().ok()?
    };

    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

fn iso_zone(text: &str) -> Option<FixedOffset> {
    if text == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text.get(1..)?.chars().filter(|&c| c != ':').collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = optional_pair(&digits, 2)?.try_into().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Two-digit component at `start`, or 0 when the digits stop before it.
/// A component that is present but malformed is rejected.
fn optional_pair(digits: &str, start: usize) -> Option<u32> {
    if digits.len() <= start {
        return Some(0);
    }
    digits.get(start..start + 2)?.parse().ok()
}

/// `YYYY-MM-DD HH:mm` with exact digit widths.
#[must_use]
pub fn parse_custom(input: &str) -> Option<AbsoluteDate> {
    if !patterns().custom.is_match(input) {
        return None;
    }
    let instant = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M").ok()?;
    Some(AbsoluteDate {
        instant,
        offset: None,
        format: AbsoluteFormat::Custom,
    })
}
