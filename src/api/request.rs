//! Request types for the attendance engine API.
//!
//! This module defines the JSON request structure for the `/reports` endpoint.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ingest::{RawTable, RawTables};
use crate::models::{AssignmentKind, AssignmentRecord};

use super::response::ApiError;

/// Request body for the `/reports` endpoint.
///
/// The three exports are sent as raw rows of text cells, exactly as read
/// from the spreadsheets. Manual assignments entered by an operator are
/// already typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Target month (1-12).
    pub month: u32,
    /// Target year.
    pub year: i32,
    /// Public holidays of the month.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    /// Time-clock export rows.
    pub punches: RawTable,
    /// Leave export rows.
    #[serde(default)]
    pub leaves: Option<RawTable>,
    /// Assignment export rows.
    #[serde(default)]
    pub assignments: Option<RawTable>,
    /// Assignments entered by hand; they override file rows.
    #[serde(default)]
    pub manual_assignments: Vec<ManualAssignmentRequest>,
}

/// A hand-entered assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualAssignmentRequest {
    /// Employee identifier.
    pub employee_id: String,
    /// Assignment date.
    pub date: NaiveDate,
    /// Work location kind.
    pub assignment_kind: AssignmentKind,
    /// Site name, for site assignments.
    #[serde(default)]
    pub site_name: Option<String>,
    /// Project, for home assignments.
    #[serde(default)]
    pub home_project: Option<String>,
}

impl From<ManualAssignmentRequest> for AssignmentRecord {
    fn from(req: ManualAssignmentRequest) -> Self {
        AssignmentRecord {
            employee_id: req.employee_id.trim().to_string(),
            date: req.date,
            assignment_kind: req.assignment_kind,
            site_name: req.site_name,
            home_project: req.home_project,
        }
    }
}

impl ReportRequest {
    /// Checks the fields serde cannot check.
    ///
    /// Month validity is left to [`crate::models::ReportingPeriod::new`],
    /// which reports it as an invalid period.
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(holiday) = self
            .holidays
            .iter()
            .find(|h| h.year() != self.year || h.month() != self.month)
        {
            return Err(ApiError::with_details(
                "VALIDATION_ERROR",
                format!("holiday {} is outside the requested month", holiday),
                format!("Holidays must fall in {:02}/{}", self.month, self.year),
            ));
        }

        if let Some(index) = self
            .manual_assignments
            .iter()
            .position(|a| a.employee_id.trim().is_empty())
        {
            return Err(ApiError::with_details(
                "VALIDATION_ERROR",
                format!("manual_assignments[{}]: employee_id is empty", index),
                "Every manual assignment needs an employee id",
            ));
        }

        Ok(())
    }

    /// Splits the request into raw tables and manual assignments.
    pub fn into_tables(self) -> (RawTables, Vec<AssignmentRecord>) {
        let tables = RawTables {
            punches: self.punches,
            leaves: self.leaves,
            assignments: self.assignments,
        };
        let manual = self.manual_assignments.into_iter().map(Into::into).collect();
        (tables, manual)
    }
}
