//! Classified day model.
//!
//! A [`ClassifiedDay`] is produced once per (employee, calendar day) by the
//! daily classifier and is never mutated afterwards. It is the sole input of
//! the monthly aggregation.

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AssignmentKind;

/// The single status assigned to an employee-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Covered by an authorized leave record.
    OnLeave,
    /// Present at the office (punch-derived or office assignment).
    Office,
    /// Assigned to a site.
    Site,
    /// Assigned to work from home.
    Home,
    /// Workday with no presence and no justification.
    UnjustifiedAbsence,
    /// Sunday or declared holiday.
    NonWorkday,
}

/// Which part of a workday is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialAbsence {
    /// Morning block not covered.
    Morning,
    /// Afternoon block not covered.
    Evening,
    /// Neither block covered.
    FullDay,
    /// Saturday morning block not covered.
    FullDaySaturday,
}

impl std::fmt::Display for PartialAbsence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartialAbsence::Morning => write!(f, "Morning"),
            PartialAbsence::Evening => write!(f, "Evening"),
            PartialAbsence::FullDay => write!(f, "Full day"),
            PartialAbsence::FullDaySaturday => write!(f, "Full day (Saturday)"),
        }
    }
}

/// Regular and overtime hour buckets.
///
/// # Example
///
/// ```
/// use attendance_engine::models::HourBuckets;
/// use rust_decimal::Decimal;
///
/// let a = HourBuckets { regular: Decimal::new(8, 0), ..HourBuckets::default() };
/// let b = HourBuckets { ot25: Decimal::new(5, 1), ..HourBuckets::default() };
/// let sum = a + b;
/// assert_eq!(sum.total(), Decimal::new(85, 1));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBuckets {
    /// Regular hours.
    pub regular: Decimal,
    /// Overtime at +25%.
    pub ot25: Decimal,
    /// Overtime at +50%.
    pub ot50: Decimal,
    /// Overtime at +100%.
    pub ot100: Decimal,
}

impl HourBuckets {
    /// Sum of all buckets.
    pub fn total(&self) -> Decimal {
        self.regular + self.ot25 + self.ot50 + self.ot100
    }

    /// Sum of the overtime buckets only.
    pub fn overtime(&self) -> Decimal {
        self.ot25 + self.ot50 + self.ot100
    }

    /// Rounds every bucket to 2 decimal places.
    pub fn rounded(&self) -> Self {
        Self {
            regular: self.regular.round_dp(2),
            ot25: self.ot25.round_dp(2),
            ot50: self.ot50.round_dp(2),
            ot100: self.ot100.round_dp(2),
        }
    }
}

impl std::ops::Add for HourBuckets {
    type Output = HourBuckets;

    fn add(self, rhs: HourBuckets) -> HourBuckets {
        HourBuckets {
            regular: self.regular + rhs.regular,
            ot25: self.ot25 + rhs.ot25,
            ot50: self.ot50 + rhs.ot50,
            ot100: self.ot100 + rhs.ot100,
        }
    }
}

impl std::ops::AddAssign for HourBuckets {
    fn add_assign(&mut self, rhs: HourBuckets) {
        *self = *self + rhs;
    }
}

/// The classification of one employee on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedDay {
    /// Employee identifier (matricule).
    pub employee_id: String,
    /// The calendar day.
    pub date: NaiveDate,
    /// Day of the week.
    pub weekday: Weekday,
    /// Whether the day is a declared holiday.
    pub is_holiday: bool,
    /// Whether the day is an eligible workday (not Sunday, not holiday).
    pub is_workday: bool,
    /// The resolved status.
    pub status: DayStatus,
    /// Standardized leave code, for leave days.
    pub leave_type: Option<String>,
    /// Assignment kind, for assignment days.
    pub assignment_kind: Option<AssignmentKind>,
    /// Site name of the assignment, if any.
    pub site_name: Option<String>,
    /// Home project of the assignment, if any.
    pub home_project: Option<String>,
    /// Hour buckets, rounded to 2 decimal places.
    pub hours: HourBuckets,
    /// Worked time overlapping the lunch window, in hours.
    pub lunch_hours: Decimal,
    /// First punch after the theoretical start plus tolerance.
    pub is_late: bool,
    /// Attendance fraction: 0, 0.5 or 1.
    pub presence_fraction: Decimal,
    /// Missing part of the day, when not fully present.
    pub partial_absence: Option<PartialAbsence>,
}

impl ClassifiedDay {
    /// Unjustified absence carried by this day, in day units.
    ///
    /// Only workdays that are neither leave nor assignment days can carry
    /// absence; a half-present day counts 0.5.
    pub fn absence_days(&self) -> Decimal {
        match self.status {
            DayStatus::Office | DayStatus::UnjustifiedAbsence if self.is_workday => {
                Decimal::ONE - self.presence_fraction
            }
            _ => Decimal::ZERO,
        }
    }
}
