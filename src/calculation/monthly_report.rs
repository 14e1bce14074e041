//! Monthly report pipeline.
//!
//! Runs the three passes of a monthly run in order, each one complete
//! before the next starts: leave resolution, daily classification, and
//! monthly aggregation. The typed input tables come from the ingestion
//! helpers.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{
    AssignmentRecord, AuditTrace, AuditWarning, DayStatus, LeaveRecord, MonthlyReport, Punch,
    ReportingPeriod,
};

use super::aggregation::aggregate_month;
use super::classifier::classify_month;
use super::leave_resolution::resolve_leaves;

/// Normalized input tables of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceInputs {
    /// De-duplicated clock events.
    pub punches: Vec<Punch>,
    /// Leave records with their standardized type.
    pub leaves: Vec<LeaveRecord>,
    /// Merged assignments, at most one per (employee, date).
    pub assignments: Vec<AssignmentRecord>,
    /// Warnings raised while the tables were normalized.
    #[serde(default)]
    pub warnings: Vec<AuditWarning>,
}

impl AttendanceInputs {
    /// Returns every employee id found in any table, without duplicates.
    pub fn employee_ids(&self) -> Vec<String> {
        self.punches
            .iter()
            .map(|p| p.employee_id.clone())
            .chain(self.leaves.iter().map(|l| l.employee_id.clone()))
            .chain(self.assignments.iter().map(|a| a.employee_id.clone()))
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }
}

/// Produces the monthly report for a period.
///
/// Returns [`crate::error::EngineError::InvalidPeriod`] when the month does
/// not exist. An empty employee set gives a report with no rows.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{AttendanceInputs, generate_monthly_report};
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::models::{Punch, ReportingPeriod};
/// use chrono::NaiveDateTime;
///
/// let config = EngineConfig::standard();
/// let period = ReportingPeriod::new(3, 2025, vec![]).unwrap();
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let inputs = AttendanceInputs {
///     punches: vec![
///         Punch { employee_id: "8".to_string(), timestamp: t("2025-03-03 08:30") },
///         Punch { employee_id: "8".to_string(), timestamp: t("2025-03-03 18:30") },
///     ],
///     ..AttendanceInputs::default()
/// };
///
/// let report = generate_monthly_report(&inputs, &period, &config).unwrap();
/// assert_eq!(report.rows.len(), 1);
/// assert_eq!(report.rows[0].unjustified_absence_days.to_string(), "25");
/// ```
pub fn generate_monthly_report(
    inputs: &AttendanceInputs,
    period: &ReportingPeriod,
    config: &EngineConfig,
) -> EngineResult<MonthlyReport> {
    let start_time = Instant::now();
    period.first_day()?;

    let mut trace = AuditTrace {
        warnings: inputs.warnings.clone(),
        ..AuditTrace::default()
    };

    let employee_ids = inputs.employee_ids();
    trace.push_step(
        "input_summary",
        "Input Summary",
        serde_json::json!({
            "month": period.month,
            "year": period.year,
            "holidays": period.holidays.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        }),
        serde_json::json!({
            "punches": inputs.punches.len(),
            "leaves": inputs.leaves.len(),
            "assignments": inputs.assignments.len(),
            "employees": employee_ids.len(),
        }),
        format!(
            "{} employees across punches, leave and assignment tables; {} eligible workdays",
            employee_ids.len(),
            period.eligible_workdays()
        ),
    );

    // Pass 1: leave resolution
    let leave_resolution = resolve_leaves(
        &inputs.leaves,
        period,
        config,
        trace.steps.len() as u32 + 1,
    );
    debug!(
        records = inputs.leaves.len(),
        justified_days = leave_resolution.calendar.len(),
        "Leave records resolved"
    );
    trace.steps.extend(leave_resolution.audit_steps);
    trace.warnings.extend(leave_resolution.warnings);

    // Pass 2: daily classification
    let classification = classify_month(
        period,
        &employee_ids,
        &inputs.punches,
        &leave_resolution.calendar,
        &inputs.assignments,
        config,
    );
    let count = |status: DayStatus| {
        classification
            .days
            .iter()
            .filter(|d| d.status == status)
            .count()
    };
    trace.push_step(
        "daily_classification",
        "Daily Classification",
        serde_json::json!({
            "employees": employee_ids.len(),
            "days_in_month": period.days().count(),
        }),
        serde_json::json!({
            "on_leave": count(DayStatus::OnLeave),
            "office": count(DayStatus::Office),
            "site": count(DayStatus::Site),
            "home": count(DayStatus::Home),
            "unjustified_absence": count(DayStatus::UnjustifiedAbsence),
            "non_workday": count(DayStatus::NonWorkday),
        }),
        format!(
            "Classified {} employee-days with precedence leave > non-workday > assignment > punches > absence",
            classification.days.len()
        ),
    );
    debug!(days = classification.days.len(), "Days classified");
    trace.warnings.extend(classification.warnings);

    // Pass 3: monthly aggregation
    let rows = aggregate_month(&employee_ids, &classification.days, period, config);
    trace.push_step(
        "monthly_aggregation",
        "Monthly Aggregation",
        serde_json::json!({ "classified_days": classification.days.len() }),
        serde_json::json!({ "rows": rows.len() }),
        format!("Built {} monthly summaries sorted by employee id", rows.len()),
    );

    trace.duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        month = period.month,
        year = period.year,
        rows = rows.len(),
        warnings = trace.warnings.len(),
        duration_us = trace.duration_us,
        "Monthly report generated"
    );

    Ok(MonthlyReport {
        report_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        period: period.clone(),
        rows,
        audit_trace: trace,
    })
}
