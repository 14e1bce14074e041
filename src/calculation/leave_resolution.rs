//! Leave resolution against the calendar.
//!
//! Every leave record is expanded into the days it actually justifies:
//! Sundays and holidays are skipped unless the rule counts calendar days,
//! short sick spans are relabeled, and each span is capped at the rule's
//! maximum number of counted days.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::{EngineConfig, LeaveRule};
use crate::models::{AuditStep, AuditWarning, LeaveRecord, ReportingPeriod, WarningSeverity};

/// Leave days justified for each (employee, date), with the leave code.
pub type LeaveCalendar = HashMap<(String, NaiveDate), String>;

/// The result of resolving every leave record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveResolution {
    /// Justified days mapped to their standardized leave code.
    pub calendar: LeaveCalendar,
    /// One audit step per resolved record.
    pub audit_steps: Vec<AuditStep>,
    /// Records that hit their maximum counted days.
    pub warnings: Vec<AuditWarning>,
}

/// Returns the rule applying to a record, after short-span relabeling.
///
/// `eligible_days` is the number of non-Sunday, non-holiday days of the
/// whole span.
pub fn applied_rule<'a>(
    record: &LeaveRecord,
    eligible_days: usize,
    config: &'a EngineConfig,
) -> &'a LeaveRule {
    let matched = config
        .leave_rule(&record.standardized_type)
        .unwrap_or_else(|| config.fallback_rule());

    match &matched.short_variant {
        Some(variant) if eligible_days < variant.below_eligible_days => config
            .leave_rule(&variant.code)
            .unwrap_or(matched),
        _ => matched,
    }
}

fn is_eligible(date: NaiveDate, rule: &LeaveRule, period: &ReportingPeriod) -> bool {
    rule.counts_calendar_days || (date.weekday() != Weekday::Sun && !period.is_holiday(date))
}

/// Resolves every leave record into justified days.
///
/// Records are applied in order; when two records cover the same day the
/// later one wins.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::resolve_leaves;
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::models::{LeaveRecord, ReportingPeriod};
/// use chrono::NaiveDate;
///
/// let config = EngineConfig::standard();
/// let period = ReportingPeriod::new(3, 2025, vec![]).unwrap();
/// let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
///
/// // Tuesday and Wednesday only: relabeled as short sick leave
/// let record = LeaveRecord {
///     employee_id: "12".to_string(),
///     leave_type_raw: "Maladie".to_string(),
///     start_date: d(4),
///     end_date: d(5),
///     standardized_type: "CONGE_MALADIE".to_string(),
/// };
///
/// let resolution = resolve_leaves(&[record], &period, &config, 1);
/// assert_eq!(
///     resolution.calendar.get(&("12".to_string(), d(4))).map(String::as_str),
///     Some("CONGE_MALADIE_COURT")
/// );
/// ```
pub fn resolve_leaves(
    records: &[LeaveRecord],
    period: &ReportingPeriod,
    config: &EngineConfig,
    step_number_start: u32,
) -> LeaveResolution {
    let mut calendar = LeaveCalendar::new();
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number = step_number_start;

    for record in records {
        let matched = config
            .leave_rule(&record.standardized_type)
            .unwrap_or_else(|| config.fallback_rule());
        let eligible_span: Vec<NaiveDate> = record
            .days()
            .filter(|d| is_eligible(*d, matched, period))
            .collect();

        let rule = applied_rule(record, eligible_span.len(), config);
        let counted: Vec<NaiveDate> = eligible_span
            .iter()
            .copied()
            .take(rule.max_days_counted)
            .collect();

        if counted.len() < eligible_span.len() {
            warnings.push(AuditWarning::new(
                "LEAVE_CAP_REACHED",
                format!(
                    "Employee {}: {} span of {} days capped at {} counted days",
                    record.employee_id,
                    rule.code,
                    eligible_span.len(),
                    rule.max_days_counted
                ),
                WarningSeverity::Low,
            ));
        }

        let in_month: Vec<NaiveDate> = counted
            .iter()
            .copied()
            .filter(|d| d.month() == period.month && d.year() == period.year)
            .collect();
        for date in &in_month {
            calendar.insert((record.employee_id.clone(), *date), rule.code.clone());
        }

        let reasoning = if rule.code != matched.code {
            format!(
                "{} span has {} eligible days (below {}), relabeled as {}; {} days counted in the month",
                matched.code,
                eligible_span.len(),
                matched
                    .short_variant
                    .as_ref()
                    .map(|v| v.below_eligible_days)
                    .unwrap_or_default(),
                rule.code,
                in_month.len()
            )
        } else {
            format!(
                "{} span has {} eligible days, max {} counted; {} days counted in the month",
                rule.code,
                eligible_span.len(),
                rule.max_days_counted,
                in_month.len()
            )
        };

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "leave_resolution".to_string(),
            rule_name: "Leave Resolution".to_string(),
            input: serde_json::json!({
                "employee_id": record.employee_id,
                "leave_type_raw": record.leave_type_raw,
                "standardized_type": record.standardized_type,
                "start_date": record.start_date.to_string(),
                "end_date": record.end_date.to_string(),
            }),
            output: serde_json::json!({
                "applied_type": rule.code,
                "payer": rule.payer,
                "is_paid": rule.is_paid,
                "eligible_days": eligible_span.len(),
                "days_counted_in_month": in_month.len(),
            }),
            reasoning,
        });
        step_number += 1;
    }

    LeaveResolution {
        calendar,
        audit_steps,
        warnings,
    }
}
