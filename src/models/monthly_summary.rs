//! Monthly summary models.
//!
//! A [`MonthlySummary`] is built purely from one employee's classified days
//! and is read-only output for export collaborators.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::HourBuckets;

/// Text shown when the discipline score is undefined.
pub const UNDEFINED_SCORE: &str = "—";

/// A 0-100 attendance reliability score.
///
/// Undefined when the employee had no expected working days.
///
/// # Example
///
/// ```
/// use attendance_engine::models::DisciplineScore;
/// use rust_decimal::Decimal;
///
/// assert_eq!(DisciplineScore::Undefined.to_string(), "—");
/// assert_eq!(DisciplineScore::Score(Decimal::new(875, 1)).to_string(), "87.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisciplineScore {
    /// A score clipped to [0, 100], rounded to 2 decimal places.
    Score(Decimal),
    /// No expected days; the score cannot be computed.
    Undefined,
}

impl std::fmt::Display for DisciplineScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisciplineScore::Score(value) => write!(f, "{:.2}", value),
            DisciplineScore::Undefined => write!(f, "{}", UNDEFINED_SCORE),
        }
    }
}

impl Serialize for DisciplineScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DisciplineScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == UNDEFINED_SCORE {
            return Ok(DisciplineScore::Undefined);
        }
        text.parse::<Decimal>()
            .map(DisciplineScore::Score)
            .map_err(serde::de::Error::custom)
    }
}

/// Premium-hours values of each overtime tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Majorations {
    /// ot25 hours × the 25% weight.
    pub ot25: Decimal,
    /// ot50 hours × the 50% weight.
    pub ot50: Decimal,
    /// ot100 hours × the 100% weight.
    pub ot100: Decimal,
    /// Sum of the three values.
    pub total: Decimal,
}

/// Leave day counts split by payer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveCounts {
    /// Paid leave days paid by the employer.
    pub employer_paid_days: u32,
    /// Unpaid leave days.
    pub unpaid_days: u32,
    /// Leave days paid by social security.
    pub social_security_days: u32,
    /// Comma-joined dd/mm/yyyy leave dates.
    pub dates_detail: String,
    /// Comma-joined sorted standardized leave codes.
    pub types_detail: String,
    /// Comma-joined sorted payers of the leave taken.
    pub payers_detail: String,
}

/// Per-employee monthly totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Employee identifier (matricule).
    pub employee_id: String,
    /// Base paid days minus absences, unpaid and social-security leave.
    pub paid_days: Decimal,
    /// Unjustified absence, in day units.
    pub unjustified_absence_days: Decimal,
    /// Comma-joined dd/mm/yyyy absence dates with the missing part.
    pub absence_detail: String,
    /// Number of late days.
    pub late_count: u32,
    /// Number of site assignment days.
    pub site_days: u32,
    /// Number of home assignment days.
    pub home_days: u32,
    /// Hours credited at the office.
    pub office_hours: HourBuckets,
    /// Hours credited on sites.
    pub site_hours: HourBuckets,
    /// Hours credited at home.
    pub home_hours: HourBuckets,
    /// All categories combined.
    pub total_hours: HourBuckets,
    /// Worked time overlapping the lunch window.
    pub lunch_hours: Decimal,
    /// Premium-hours values.
    pub majorations: Majorations,
    /// Leave counts and details.
    pub leave: LeaveCounts,
    /// Comma-joined site names.
    pub site_locations: String,
    /// Comma-joined home projects.
    pub home_projects: String,
    /// Workdays of the month (not Sunday, not holiday).
    pub eligible_workdays: u32,
    /// Eligible workdays minus leave days on those workdays.
    pub expected_days: i64,
    /// Attendance reliability score.
    pub discipline_score: DisciplineScore,
}
