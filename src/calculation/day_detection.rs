//! Day detection and time-window arithmetic.
//!
//! This module provides utilities for determining the day type (weekday,
//! Saturday, Sunday, holiday) of a calendar date and for measuring how much of
//! a worked interval falls inside fixed time windows such as lunch or night.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the type of day for overtime calculation.
///
/// Holidays take precedence over the weekday they fall on.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::DayType;
///
/// let day_type = DayType::Saturday;
/// assert_eq!(format!("{:?}", day_type), "Saturday");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday.
    Weekday,
    /// Saturday - regular hours stop at the morning cutoff.
    Saturday,
    /// Sunday - every hour is overtime.
    Sunday,
    /// Declared holiday - every hour is overtime.
    Holiday,
}

impl DayType {
    /// Returns true for days on which every worked hour is overtime.
    pub fn is_rest_day(&self) -> bool {
        matches!(self, DayType::Sunday | DayType::Holiday)
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Weekday => write!(f, "Weekday"),
            DayType::Saturday => write!(f, "Saturday"),
            DayType::Sunday => write!(f, "Sunday"),
            DayType::Holiday => write!(f, "Holiday"),
        }
    }
}

/// Determines the day type for a given date.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{get_day_type, DayType};
/// use chrono::NaiveDate;
///
/// // 2025-03-08 is a Saturday
/// let date = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
/// assert_eq!(get_day_type(date, false), DayType::Saturday);
/// assert_eq!(get_day_type(date, true), DayType::Holiday);
/// ```
pub fn get_day_type(date: NaiveDate, is_holiday: bool) -> DayType {
    if is_holiday {
        return DayType::Holiday;
    }
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Weekday,
    }
}

/// Combines a date and a wall-clock time.
pub fn at(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Converts a number of seconds to hours.
pub fn to_hours(seconds: i64) -> Decimal {
    Decimal::from(seconds) / Decimal::from(3600)
}

/// Returns the seconds between two instants, or zero when `end <= start`.
pub fn seconds_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    if end <= start {
        return 0;
    }
    (end - start).num_seconds()
}

/// Returns the hours between two instants, or zero when `end <= start`.
///
/// Second precision; no rounding is applied.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Decimal {
    to_hours(seconds_between(start, end))
}

/// Returns the seconds shared by the intervals `[a_start, a_end)` and
/// `[b_start, b_end)`.
pub fn overlap_seconds(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> i64 {
    seconds_between(a_start.max(b_start), a_end.min(b_end))
}

/// Returns the hours shared by the intervals `[a_start, a_end)` and
/// `[b_start, b_end)`.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::overlap_hours;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let hours = overlap_hours(
///     t("2025-03-03 13:00"), t("2025-03-03 19:00"),
///     t("2025-03-03 12:30"), t("2025-03-03 14:30"),
/// );
/// assert_eq!(hours, Decimal::new(15, 1));
/// ```
pub fn overlap_hours(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> Decimal {
    to_hours(overlap_seconds(a_start, a_end, b_start, b_end))
}

/// Returns the seconds of `[start, end)` that fall inside the nightly window.
///
/// The window opens at `night_start` on each day and closes at `night_end`
/// on the following day. Intervals spanning several nights are handled.
pub fn night_overlap_seconds(
    start: NaiveDateTime,
    end: NaiveDateTime,
    night_start: NaiveTime,
    night_end: NaiveTime,
) -> i64 {
    if end <= start {
        return 0;
    }

    // The night that began the previous evening can still be open at `start`.
    let mut day = start
        .date()
        .checked_sub_days(Days::new(1))
        .unwrap_or(start.date());
    let last = end.date();
    let mut total = 0;

    while day <= last {
        let Some(next) = day.checked_add_days(Days::new(1)) else {
            break;
        };
        total += overlap_seconds(start, end, at(day, night_start), at(next, night_end));
        day = next;
    }

    total
}

/// Returns the hours of `[start, end)` that fall inside the nightly window.
pub fn night_overlap_hours(
    start: NaiveDateTime,
    end: NaiveDateTime,
    night_start: NaiveTime,
    night_end: NaiveTime,
) -> Decimal {
    to_hours(night_overlap_seconds(start, end, night_start, night_end))
}
