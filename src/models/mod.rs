//! Core data models for the attendance engine.
//!
//! All entities are value records with no shared mutable state.

mod assignment;
mod classified_day;
mod leave;
mod monthly_summary;
mod period;
mod punch;
mod report;

pub use assignment::{AssignmentKind, AssignmentRecord};
pub use classified_day::{ClassifiedDay, DayStatus, HourBuckets, PartialAbsence};
pub use leave::LeaveRecord;
pub use monthly_summary::{
    DisciplineScore, LeaveCounts, Majorations, MonthlySummary, UNDEFINED_SCORE,
};
pub use period::ReportingPeriod;
pub use punch::Punch;
pub use report::{AuditStep, AuditTrace, AuditWarning, MonthlyReport, WarningSeverity};
