//! Raw time-clock punch model.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single clock in/out event for one employee.
///
/// Punches are immutable once ingested. Pairing into worked intervals happens
/// per employee-day during classification.
///
/// # Example
///
/// ```
/// use attendance_engine::models::Punch;
/// use chrono::NaiveDateTime;
///
/// let punch = Punch {
///     employee_id: "1042".to_string(),
///     timestamp: NaiveDateTime::parse_from_str("2025-03-03 08:27:00", "%Y-%m-%d %H:%M:%S").unwrap(),
/// };
/// assert_eq!(punch.date().to_string(), "2025-03-03");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Punch {
    /// Employee identifier (matricule).
    pub employee_id: String,
    /// When the clock event happened.
    pub timestamp: NaiveDateTime,
}

impl Punch {
    /// Returns the calendar day the punch belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
