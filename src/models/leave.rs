//! Leave record model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An authorized absence span for one employee.
///
/// `standardized_type` is resolved once at ingestion from the leave rule
/// table. The short-sick relabeling happens later, when the span is resolved
/// against the month's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// Employee identifier (matricule).
    pub employee_id: String,
    /// Leave label as written in the source table.
    pub leave_type_raw: String,
    /// First day of the span (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the span (inclusive).
    pub end_date: NaiveDate,
    /// Standardized leave code (e.g. "CONGE_PAYE").
    pub standardized_type: String,
}

impl LeaveRecord {
    /// Iterates every calendar day of the span.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }
}
