//! Daily classification.
//!
//! Each (employee, calendar day) receives exactly one status, resolved in a
//! fixed precedence:
//!
//! 1. leave justified for the day
//! 2. Sunday or declared holiday
//! 3. site, home or office assignment
//! 4. punch-derived presence
//! 5. unjustified absence on a workday

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::models::{
    AssignmentKind, AssignmentRecord, AuditWarning, ClassifiedDay, DayStatus, HourBuckets, Punch,
    ReportingPeriod, WarningSeverity,
};

use super::day_detection::at;
use super::leave_resolution::LeaveCalendar;
use super::overtime::compute_overtime;
use super::presence::{PunchPair, evaluate_presence, pair_punches};

/// Everything known about one employee on one day.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayInputs<'a> {
    /// Clock events of the day, in any order.
    pub punches: &'a [NaiveDateTime],
    /// Standardized leave code justifying the day, if any.
    pub leave_code: Option<&'a str>,
    /// Declared assignment for the day, if any.
    pub assignment: Option<&'a AssignmentRecord>,
}

/// The classification of one day plus anything worth flagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayClassification {
    /// The classified day.
    pub day: ClassifiedDay,
    /// Warnings raised while classifying.
    pub warnings: Vec<AuditWarning>,
}

/// All classified days of a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthClassification {
    /// One record per (employee, day), grouped by employee, dates ascending.
    pub days: Vec<ClassifiedDay>,
    /// Warnings raised while classifying.
    pub warnings: Vec<AuditWarning>,
}

#[derive(Debug, Default)]
struct PairTotals {
    hours: HourBuckets,
    lunch_hours: Decimal,
}

/// Runs every punch pair of a day through the overtime calculator with one
/// shared regular quota.
fn credit_pairs(pairs: &[PunchPair], is_holiday: bool, config: &EngineConfig) -> PairTotals {
    pairs.iter().fold(PairTotals::default(), |acc, pair| {
        let split = compute_overtime(
            pair.start,
            pair.end,
            is_holiday,
            acc.hours.regular,
            config.schedule(),
        );
        PairTotals {
            hours: acc.hours + split.hours,
            lunch_hours: acc.lunch_hours + split.lunch_hours,
        }
    })
}

/// Classifies one employee on one day.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{DayInputs, classify_day};
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::models::{DayStatus, ReportingPeriod};
/// use chrono::{NaiveDate, NaiveDateTime};
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::standard();
/// let period = ReportingPeriod::new(3, 2025, vec![]).unwrap();
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let punches = [t("2025-03-03 09:15"), t("2025-03-03 18:30")];
///
/// let result = classify_day(
///     "42",
///     NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
///     DayInputs { punches: &punches, ..DayInputs::default() },
///     &period,
///     &config,
/// );
///
/// assert_eq!(result.day.status, DayStatus::Office);
/// assert!(result.day.is_late);
/// assert_eq!(result.day.presence_fraction, Decimal::ONE);
/// ```
pub fn classify_day(
    employee_id: &str,
    date: NaiveDate,
    inputs: DayInputs<'_>,
    period: &ReportingPeriod,
    config: &EngineConfig,
) -> DayClassification {
    let is_holiday = period.is_holiday(date);
    let is_workday = period.is_workday(date);
    let mut warnings = Vec::new();

    let mut day = ClassifiedDay {
        employee_id: employee_id.to_string(),
        date,
        weekday: date.weekday(),
        is_holiday,
        is_workday,
        status: DayStatus::UnjustifiedAbsence,
        leave_type: None,
        assignment_kind: None,
        site_name: None,
        home_project: None,
        hours: HourBuckets::default(),
        lunch_hours: Decimal::ZERO,
        is_late: false,
        presence_fraction: Decimal::ZERO,
        partial_absence: None,
    };

    if let Some(code) = inputs.leave_code {
        day.status = DayStatus::OnLeave;
        day.leave_type = Some(code.to_string());
        return DayClassification { day, warnings };
    }

    if !is_workday {
        // Work on a rest day is still paid, entirely as overtime.
        let (pairs, _) = pair_punches(inputs.punches);
        let totals = credit_pairs(&pairs, is_holiday, config);
        day.status = DayStatus::NonWorkday;
        day.hours = totals.hours.rounded();
        day.lunch_hours = totals.lunch_hours.round_dp(2);
        return DayClassification { day, warnings };
    }

    if let Some(assignment) = inputs.assignment {
        let (shift_start, shift_end) = config.schedule().theoretical_shift(date.weekday());
        let split = compute_overtime(
            at(date, shift_start),
            at(date, shift_end),
            is_holiday,
            Decimal::ZERO,
            config.schedule(),
        );
        day.status = match assignment.assignment_kind {
            AssignmentKind::Site | AssignmentKind::SiteAndOffice => DayStatus::Site,
            AssignmentKind::Home => DayStatus::Home,
            AssignmentKind::Office => DayStatus::Office,
        };
        day.assignment_kind = Some(assignment.assignment_kind);
        day.site_name = assignment.site_name.clone();
        day.home_project = assignment.home_project.clone();
        day.hours = split.hours.rounded();
        day.presence_fraction = Decimal::ONE;
        return DayClassification { day, warnings };
    }

    let presence = evaluate_presence(inputs.punches, date, config.presence());
    let totals = credit_pairs(&presence.pairs, is_holiday, config);

    if let Some(orphan) = presence.orphan {
        warnings.push(AuditWarning::new(
            "ORPHAN_PUNCH",
            format!(
                "Employee {}: unmatched punch at {} on {}",
                employee_id,
                orphan.format("%H:%M"),
                date.format("%d/%m/%Y")
            ),
            WarningSeverity::Low,
        ));
    }

    let schedule = config.schedule();
    let late_after = at(date, schedule.day_start) + Duration::minutes(schedule.late_tolerance_minutes);

    day.presence_fraction = presence.fraction;
    day.partial_absence = presence.partial_absence;

    // Punches outside both presence blocks earn nothing on an absent day.
    if presence.fraction > Decimal::ZERO {
        day.status = DayStatus::Office;
        day.hours = totals.hours.rounded();
        day.lunch_hours = totals.lunch_hours.round_dp(2);
        day.is_late = inputs
            .punches
            .iter()
            .min()
            .is_some_and(|first| *first > late_after);
    }

    DayClassification { day, warnings }
}

/// Classifies every day of the period for every listed employee.
///
/// `assignments` must already be merged: when several entries share an
/// (employee, date) the last one is used.
pub fn classify_month(
    period: &ReportingPeriod,
    employee_ids: &[String],
    punches: &[Punch],
    leave_calendar: &LeaveCalendar,
    assignments: &[AssignmentRecord],
    config: &EngineConfig,
) -> MonthClassification {
    let mut punches_by_day: HashMap<(&str, NaiveDate), Vec<NaiveDateTime>> = HashMap::new();
    for punch in punches {
        punches_by_day
            .entry((punch.employee_id.as_str(), punch.date()))
            .or_default()
            .push(punch.timestamp);
    }

    let assignment_by_day: HashMap<(&str, NaiveDate), &AssignmentRecord> = assignments
        .iter()
        .map(|a| ((a.employee_id.as_str(), a.date), a))
        .collect();

    let mut days = Vec::new();
    let mut warnings = Vec::new();

    for employee_id in employee_ids {
        for date in period.days() {
            let key = (employee_id.as_str(), date);
            let inputs = DayInputs {
                punches: punches_by_day.get(&key).map(Vec::as_slice).unwrap_or(&[]),
                leave_code: leave_calendar
                    .get(&(employee_id.clone(), date))
                    .map(String::as_str),
                assignment: assignment_by_day.get(&key).copied(),
            };

            let result = classify_day(employee_id, date, inputs, period, config);
            days.push(result.day);
            warnings.extend(result.warnings);
        }
    }

    MonthClassification { days, warnings }
}
