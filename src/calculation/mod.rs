//! Calculation logic for the attendance engine.
//!
//! This module contains day detection and time-window arithmetic, the
//! overtime calculator, the day presence evaluator, leave resolution, the
//! daily classifier, monthly aggregation with the discipline score, and the
//! pipeline that chains them into a monthly report.

mod aggregation;
mod classifier;
mod day_detection;
mod leave_resolution;
mod monthly_report;
mod overtime;
mod presence;
mod scoring;

pub use aggregation::{
    aggregate_month, compare_employee_ids, compute_majorations, summarize_employee,
};
pub use classifier::{
    DayClassification, DayInputs, MonthClassification, classify_day, classify_month,
};
pub use day_detection::{
    DayType, at, get_day_type, hours_between, night_overlap_hours, overlap_hours,
};
pub use leave_resolution::{LeaveCalendar, LeaveResolution, applied_rule, resolve_leaves};
pub use monthly_report::{AttendanceInputs, generate_monthly_report};
pub use overtime::{OvertimeSplit, compute_overtime};
pub use presence::{PresenceEvaluation, PunchPair, evaluate_presence, pair_punches};
pub use scoring::discipline_score;
