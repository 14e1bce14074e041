//! Overtime calculation functionality.
//!
//! This module splits one worked interval into regular and tiered overtime
//! hours according to the working-time policy.
//!
//! ## Tier Structure
//!
//! - **Sunday or holiday:** every hour is overtime; night hours at +100%,
//!   other hours at +50%.
//! - **Saturday:** regular hours until the morning cutoff, everything after
//!   at +50%.
//! - **Monday to Friday:** the lunch window is unpaid; worked time fills the
//!   daily regular quota, the excess is overtime at +25%, or +50% for the part
//!   that falls inside the night window.

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::config::SchedulePolicy;
use crate::models::HourBuckets;

use super::day_detection::{
    DayType, at, get_day_type, night_overlap_seconds, overlap_seconds, seconds_between, to_hours,
};

/// The result of splitting one worked interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSplit {
    /// The day type that selected the tier rules.
    pub day_type: DayType,
    /// Regular and overtime buckets. Their sum equals `worked_hours`.
    pub hours: HourBuckets,
    /// Time counted as worked, after removing the lunch window.
    pub worked_hours: Decimal,
    /// Time of the interval inside the unpaid lunch window.
    pub lunch_hours: Decimal,
    /// Time of the interval inside the night window.
    pub night_hours: Decimal,
}

impl OvertimeSplit {
    fn empty(day_type: DayType) -> Self {
        Self {
            day_type,
            hours: HourBuckets::default(),
            worked_hours: Decimal::ZERO,
            lunch_hours: Decimal::ZERO,
            night_hours: Decimal::ZERO,
        }
    }
}

/// Splits a worked interval into regular, ot25, ot50 and ot100 hours.
///
/// The weekday is taken from the date of `start`. `regular_already_counted`
/// is the part of the daily regular quota consumed by earlier intervals of
/// the same day; it lets several punch pairs share one quota.
///
/// Zero-length or inverted intervals yield zero in every bucket. No rounding
/// is applied here.
///
/// # Examples
///
/// ## Sunday evening
///
/// ```
/// use attendance_engine::calculation::compute_overtime;
/// use attendance_engine::config::EngineConfig;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::standard();
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
///
/// // 2025-03-02 is a Sunday
/// let split = compute_overtime(
///     t("2025-03-02 20:00"),
///     t("2025-03-02 23:00"),
///     false,
///     Decimal::ZERO,
///     config.schedule(),
/// );
///
/// assert_eq!(split.hours.regular, Decimal::ZERO);
/// assert_eq!(split.hours.ot50, Decimal::ONE);
/// assert_eq!(split.hours.ot100, Decimal::new(2, 0));
/// ```
///
/// ## Weekday quota shared by two pairs
///
/// ```
/// use attendance_engine::calculation::compute_overtime;
/// use attendance_engine::config::EngineConfig;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::standard();
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
///
/// // 2025-03-03 is a Monday
/// let morning = compute_overtime(t("2025-03-03 08:00"), t("2025-03-03 12:00"), false, Decimal::ZERO, config.schedule());
/// let afternoon = compute_overtime(
///     t("2025-03-03 13:00"),
///     t("2025-03-03 19:00"),
///     false,
///     morning.hours.regular,
///     config.schedule(),
/// );
///
/// assert_eq!(morning.hours.regular, Decimal::new(4, 0));
/// assert_eq!(afternoon.hours.regular, Decimal::new(4, 0));
/// assert_eq!(afternoon.hours.ot25, Decimal::new(5, 1));
/// ```
pub fn compute_overtime(
    start: NaiveDateTime,
    end: NaiveDateTime,
    is_holiday: bool,
    regular_already_counted: Decimal,
    schedule: &SchedulePolicy,
) -> OvertimeSplit {
    let date = start.date();
    let day_type = get_day_type(date, is_holiday);

    if end <= start {
        return OvertimeSplit::empty(day_type);
    }

    let duration = seconds_between(start, end);
    let night = night_overlap_seconds(start, end, schedule.night_start, schedule.night_end);

    match day_type {
        DayType::Sunday | DayType::Holiday => OvertimeSplit {
            day_type,
            hours: HourBuckets {
                ot50: to_hours(duration - night),
                ot100: to_hours(night),
                ..HourBuckets::default()
            },
            worked_hours: to_hours(duration),
            lunch_hours: Decimal::ZERO,
            night_hours: to_hours(night),
        },
        DayType::Saturday => {
            let cutoff = at(date, schedule.saturday_cutoff);
            let regular = seconds_between(start, end.min(cutoff));
            OvertimeSplit {
                day_type,
                hours: HourBuckets {
                    regular: to_hours(regular),
                    ot50: to_hours(duration - regular),
                    ..HourBuckets::default()
                },
                worked_hours: to_hours(duration),
                lunch_hours: Decimal::ZERO,
                night_hours: to_hours(night),
            }
        }
        DayType::Weekday => {
            let lunch = match schedule.lunch_window(date.weekday()) {
                Some((lunch_start, lunch_end)) => {
                    overlap_seconds(start, end, at(date, lunch_start), at(date, lunch_end))
                }
                None => 0,
            };
            let worked = duration - lunch;

            let remaining_quota = ((schedule.daily_regular_hours - regular_already_counted)
                * Decimal::from(3600))
            .round()
            .to_i64()
            .unwrap_or(0)
            .max(0);
            let regular = worked.min(remaining_quota);
            let overtime = worked - regular;

            // Night premium on a working day stops at the 50% tier.
            let night_overtime = overtime.min(night);

            OvertimeSplit {
                day_type,
                hours: HourBuckets {
                    regular: to_hours(regular),
                    ot25: to_hours(overtime - night_overtime),
                    ot50: to_hours(night_overtime),
                    ot100: Decimal::ZERO,
                },
                worked_hours: to_hours(worked),
                lunch_hours: to_hours(lunch),
                night_hours: to_hours(night),
            }
        }
    }
}
