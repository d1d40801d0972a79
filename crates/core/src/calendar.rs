//! Calendar arithmetic on wall-clock instants.
//!
//! Shifting by months and years is calendar-aware: the day of month is kept
//! when it exists and clamped to the last day of the target month otherwise
//! (Jan 31 + 1M = Feb 28/29). Days and weeks move the date, hours and smaller
//! units move the clock. All functions return `None` instead of leaving the
//! representable range.

use chrono::{Datelike, Days, Months, NaiveDate, TimeDelta, Timelike, Weekday};

use crate::scanner::{Sign, Step};
use crate::types::{EvalOptions, Instant, TruncationMode, Unit};

/// Apply one scanned operation to `instant`.
#[must_use]
pub fn apply(
    instant: Instant,
    step: Step,
    mode: TruncationMode,
    options: &EvalOptions,
) -> Option<Instant> {
    match step {
        Step::Truncate(unit) => truncate(instant, unit, mode, options.week_start),
        Step::Shift { sign, amount, unit } => shift(instant, sign, amount, unit),
    }
}

/// Move `instant` by `amount` units.
#[must_use]
pub fn shift(instant: Instant, sign: Sign, amount: u64, unit: Unit) -> Option<Instant> {
    match unit {
        Unit::Year => shift_months(instant, sign, amount.checked_mul(12)?),
        Unit::Month => shift_months(instant, sign, amount),
        Unit::Week => shift_days(instant, sign, amount.checked_mul(7)?),
        Unit::Day => shift_days(instant, sign, amount),
        Unit::Hour => shift_seconds(instant, sign, amount.checked_mul(3600)?),
        Unit::Minute => shift_seconds(instant, sign, amount.checked_mul(60)?),
        Unit::Second => shift_seconds(instant, sign, amount),
    }
}

fn shift_months(instant: Instant, sign: Sign, months: u64) -> Option<Instant> {
    let months = Months::new(u32::try_from(months).ok()?);
    match sign {
        Sign::Plus => instant.checked_add_months(months),
        Sign::Minus => instant.checked_sub_months(months),
    }
}

fn shift_days(instant: Instant, sign: Sign, days: u64) -> Option<Instant> {
    let days = Days::new(days);
    match sign {
        Sign::Plus => instant.checked_add_days(days),
        Sign::Minus => instant.checked_sub_days(days),
    }
}

fn shift_seconds(instant: Instant, sign: Sign, seconds: u64) -> Option<Instant> {
    let delta = TimeDelta::try_seconds(i64::try_from(seconds).ok()?)?;
    match sign {
        Sign::Plus => instant.checked_add_signed(delta),
        Sign::Minus => instant.checked_sub_signed(delta),
    }
}

/// Round `instant` to the start or end of the `unit` it falls in.
#[must_use]
pub fn truncate(
    instant: Instant,
    unit: Unit,
    mode: TruncationMode,
    week_start: Weekday,
) -> Option<Instant> {
    match mode {
        TruncationMode::StartOf => start_of(instant, unit, week_start),
        TruncationMode::EndOf => end_of(instant, unit, week_start),
    }
}

/// First instant of the `unit` containing `instant`.
#[must_use]
pub fn start_of(instant: Instant, unit: Unit, week_start: Weekday) -> Option<Instant> {
    let date = instant.date();
    match unit {
        Unit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0),
        Unit::Month => date.with_day(1)?.and_hms_opt(0, 0, 0),
        Unit::Week => {
            let back = days_since_week_start(date.weekday(), week_start);
            date.checked_sub_days(Days::new(back))?.and_hms_opt(0, 0, 0)
        }
        Unit::Day => date.and_hms_opt(0, 0, 0),
        Unit::Hour => date.and_hms_opt(instant.hour(), 0, 0),
        Unit::Minute => date.and_hms_opt(instant.hour(), instant.minute(), 0),
        Unit::Second => instant.with_nanosecond(0),
    }
}

/// Last millisecond of the `unit` containing `instant`.
#[must_use]
pub fn end_of(instant: Instant, unit: Unit, week_start: Weekday) -> Option<Instant> {
    let next = shift(start_of(instant, unit, week_start)?, Sign::Plus, 1, unit)?;
    next.checked_sub_signed(TimeDelta::try_milliseconds(1)?)
}

fn days_since_week_start(day: Weekday, week_start: Weekday) -> u64 {
    let day = u64::from(day.num_days_from_monday());
    let start = u64::from(week_start.num_days_from_monday());
    (day + 7 - start) % 7
}
