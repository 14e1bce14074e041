//! Monthly aggregation.
//!
//! Folds the classified days of one employee into a [`MonthlySummary`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::config::{EngineConfig, MajorationRates, Payer};
use crate::models::{
    ClassifiedDay, DayStatus, HourBuckets, LeaveCounts, Majorations, MonthlySummary,
    ReportingPeriod,
};

use super::scoring::discipline_score;

/// Computes the premium-hours values of an hour total.
///
/// Each tier is rounded to 2 decimal places, then summed.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::compute_majorations;
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::models::HourBuckets;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::standard();
/// let hours = HourBuckets {
///     ot25: Decimal::new(3, 0),
///     ot50: Decimal::new(1, 0),
///     ot100: Decimal::new(2, 0),
///     ..HourBuckets::default()
/// };
///
/// let majorations = compute_majorations(&hours, &config.payroll().majoration_rates);
/// assert_eq!(majorations.ot25, Decimal::new(75, 2));
/// assert_eq!(majorations.total, Decimal::new(325, 2));
/// ```
pub fn compute_majorations(hours: &HourBuckets, rates: &MajorationRates) -> Majorations {
    let ot25 = (hours.ot25 * rates.ot25).round_dp(2);
    let ot50 = (hours.ot50 * rates.ot50).round_dp(2);
    let ot100 = (hours.ot100 * rates.ot100).round_dp(2);
    Majorations {
        ot25,
        ot50,
        ot100,
        total: (ot25 + ot50 + ot100).round_dp(2),
    }
}

/// Orders employee ids: non-numeric ids first (by text), then numeric ids
/// ascending. Ties fall back to the text.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::compare_employee_ids;
///
/// let mut ids = vec!["10", "9", "ext-1", "2.5"];
/// ids.sort_by(|a, b| compare_employee_ids(a, b));
/// assert_eq!(ids, vec!["ext-1", "2.5", "9", "10"]);
/// ```
pub fn compare_employee_ids(a: &str, b: &str) -> Ordering {
    let numeric = |id: &str| id.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    match (numeric(a), numeric(b)) {
        (None, None) => a.cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
    }
}

fn join_sorted<I: IntoIterator<Item = String>>(values: I) -> String {
    values
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}

fn leave_counts(days: &[&ClassifiedDay], config: &EngineConfig) -> LeaveCounts {
    let mut counts = LeaveCounts::default();
    let mut dates = Vec::new();
    let mut codes = BTreeSet::new();
    let mut payers = BTreeSet::new();

    for day in days.iter().filter(|d| d.status == DayStatus::OnLeave) {
        let code = day.leave_type.as_deref().unwrap_or_default();
        let rule = config
            .leave_rule(code)
            .unwrap_or_else(|| config.fallback_rule());

        if !rule.is_paid {
            counts.unpaid_days += 1;
        } else if rule.payer == Payer::Employer {
            counts.employer_paid_days += 1;
        }
        if rule.payer == Payer::SocialSecurity {
            counts.social_security_days += 1;
        }

        dates.push(day.date);
        codes.insert(rule.code.clone());
        payers.insert(rule.payer.to_string());
    }

    dates.sort();
    counts.dates_detail = dates
        .iter()
        .map(|d| d.format("%d/%m/%Y").to_string())
        .collect::<Vec<_>>()
        .join(", ");
    counts.types_detail = join_sorted(codes);
    counts.payers_detail = join_sorted(payers);
    counts
}

/// Folds one employee's classified days into a monthly summary.
///
/// Days belonging to other employees are ignored.
pub fn summarize_employee(
    employee_id: &str,
    days: &[ClassifiedDay],
    period: &ReportingPeriod,
    config: &EngineConfig,
) -> MonthlySummary {
    let own = days
        .iter()
        .filter(|d| d.employee_id == employee_id)
        .collect();
    summarize_days(employee_id, own, period, config)
}

fn summarize_days(
    employee_id: &str,
    mut own: Vec<&ClassifiedDay>,
    period: &ReportingPeriod,
    config: &EngineConfig,
) -> MonthlySummary {
    own.sort_by_key(|d| d.date);

    let payroll = config.payroll();
    let mut office_hours = HourBuckets::default();
    let mut site_hours = HourBuckets::default();
    let mut home_hours = HourBuckets::default();
    let mut lunch_hours = Decimal::ZERO;
    let mut absence_days = Decimal::ZERO;
    let mut absence_detail = Vec::new();
    let mut late_count = 0;
    let mut site_days = 0;
    let mut home_days = 0;
    let mut leave_on_workdays: i64 = 0;

    for day in &own {
        match day.status {
            DayStatus::Site => {
                site_days += 1;
                site_hours += day.hours;
            }
            DayStatus::Home => {
                home_days += 1;
                home_hours += day.hours;
            }
            DayStatus::OnLeave => {
                if day.is_workday {
                    leave_on_workdays += 1;
                }
            }
            DayStatus::Office | DayStatus::NonWorkday | DayStatus::UnjustifiedAbsence => {
                office_hours += day.hours;
            }
        }

        lunch_hours += day.lunch_hours;
        if day.is_late {
            late_count += 1;
        }

        let missing = day.absence_days();
        if missing > Decimal::ZERO {
            absence_days += missing;
            let label = day
                .partial_absence
                .map(|p| format!(" ({})", p))
                .unwrap_or_default();
            absence_detail.push(format!("{}{}", day.date.format("%d/%m/%Y"), label));
        }
    }

    let total_hours = (office_hours + site_hours + home_hours).rounded();
    let majorations = compute_majorations(&total_hours, &payroll.majoration_rates);
    let leave = leave_counts(&own, config);

    let paid_days = (Decimal::from(payroll.base_paid_days)
        - absence_days
        - Decimal::from(leave.unpaid_days)
        - Decimal::from(leave.social_security_days))
    .max(Decimal::ZERO);

    let eligible_workdays = period.eligible_workdays();
    let expected_days = i64::from(eligible_workdays) - leave_on_workdays;

    MonthlySummary {
        employee_id: employee_id.to_string(),
        paid_days,
        unjustified_absence_days: absence_days,
        absence_detail: absence_detail.join(", "),
        late_count,
        site_days,
        home_days,
        office_hours: office_hours.rounded(),
        site_hours: site_hours.rounded(),
        home_hours: home_hours.rounded(),
        total_hours,
        lunch_hours: lunch_hours.round_dp(2),
        majorations,
        leave,
        site_locations: join_sorted(own.iter().filter_map(|d| d.site_name.clone())),
        home_projects: join_sorted(own.iter().filter_map(|d| d.home_project.clone())),
        eligible_workdays,
        expected_days,
        discipline_score: discipline_score(
            late_count,
            absence_days,
            majorations.total,
            expected_days,
            payroll,
        ),
    }
}

/// Builds one summary per employee, sorted by employee id.
///
/// Employees without any classified day still get a row of zeros.
pub fn aggregate_month(
    employee_ids: &[String],
    days: &[ClassifiedDay],
    period: &ReportingPeriod,
    config: &EngineConfig,
) -> Vec<MonthlySummary> {
    let mut by_employee: BTreeMap<&str, Vec<&ClassifiedDay>> = employee_ids
        .iter()
        .map(|id| (id.as_str(), Vec::new()))
        .collect();
    for day in days {
        if let Some(own) = by_employee.get_mut(day.employee_id.as_str()) {
            own.push(day);
        }
    }

    let mut rows: Vec<MonthlySummary> = by_employee
        .into_iter()
        .map(|(id, own)| summarize_days(id, own, period, config))
        .collect();
    rows.sort_by(|a, b| compare_employee_ids(&a.employee_id, &b.employee_id));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentKind, DisciplineScore, PartialAbsence};
    use chrono::{Datelike, NaiveDate};
    use std::str::FromStr;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn march() -> ReportingPeriod {
        ReportingPeriod::new(3, 2025, vec![]).unwrap()
    }

    /// A month where every workday is an unjustified absence.
    fn absent_month(employee_id: &str) -> Vec<ClassifiedDay> {
        let period = march();
        period
            .days()
            .map(|date| {
                let is_workday = period.is_workday(date);
                ClassifiedDay {
                    employee_id: employee_id.to_string(),
                    date,
                    weekday: date.weekday(),
                    is_holiday: false,
                    is_workday,
                    status: if is_workday {
                        DayStatus::UnjustifiedAbsence
                    } else {
                        DayStatus::NonWorkday
                    },
                    leave_type: None,
                    assignment_kind: None,
                    site_name: None,
                    home_project: None,
                    hours: HourBuckets::default(),
                    lunch_hours: Decimal::ZERO,
                    is_late: false,
                    presence_fraction: Decimal::ZERO,
                    partial_absence: is_workday.then_some(PartialAbsence::FullDay),
                }
            })
            .collect()
    }

    fn set_day(days: &mut [ClassifiedDay], date: &str, update: impl Fn(&mut ClassifiedDay)) {
        let date = make_date(date);
        let day = days.iter_mut().find(|d| d.date == date).unwrap();
        update(day);
    }

    fn present(day: &mut ClassifiedDay) {
        day.status = DayStatus::Office;
        day.presence_fraction = Decimal::ONE;
        day.partial_absence = None;
        day.hours.regular = dec("8");
    }

    // ==========================================================================
    // AG-001: No activity
    // ==========================================================================
    #[test]
    fn test_ag_001_no_activity_month() {
        let days = absent_month("7");
        let summary = summarize_employee("7", &days, &march(), &EngineConfig::standard());

        assert_eq!(summary.total_hours, HourBuckets::default());
        assert_eq!(summary.unjustified_absence_days, dec("26"));
        assert_eq!(summary.paid_days, dec("0"));
        assert_eq!(summary.eligible_workdays, 26);
        assert_eq!(summary.expected_days, 26);
        // 26 x 4 = 104 penalty points over 26 days
        assert_eq!(summary.discipline_score, DisciplineScore::Score(dec("0")));
        assert!(summary.absence_detail.starts_with("01/03/2025 (Full day), 03/03/2025"));
    }

    // ==========================================================================
    // AG-002: Hour categories and majorations
    // ==========================================================================
    #[test]
    fn test_ag_002_hours_split_by_category() {
        let mut days = absent_month("7");
        set_day(&mut days, "2025-03-03", |d| {
            present(d);
            d.hours.ot25 = dec("1.5");
            d.lunch_hours = dec("0.25");
        });
        set_day(&mut days, "2025-03-04", |d| {
            d.status = DayStatus::Site;
            d.presence_fraction = Decimal::ONE;
            d.partial_absence = None;
            d.assignment_kind = Some(AssignmentKind::Site);
            d.site_name = Some("Tower B".to_string());
            d.hours.regular = dec("8");
        });
        set_day(&mut days, "2025-03-05", |d| {
            d.status = DayStatus::Home;
            d.presence_fraction = Decimal::ONE;
            d.partial_absence = None;
            d.home_project = Some("Audit".to_string());
            d.hours.regular = dec("8");
        });
        set_day(&mut days, "2025-03-09", |d| {
            d.hours.ot100 = dec("2");
            d.hours.ot50 = dec("1");
        });

        let summary = summarize_employee("7", &days, &march(), &EngineConfig::standard());

        assert_eq!(summary.office_hours.regular, dec("8"));
        assert_eq!(summary.office_hours.ot100, dec("2"));
        assert_eq!(summary.site_hours.regular, dec("8"));
        assert_eq!(summary.home_hours.regular, dec("8"));
        assert_eq!(summary.total_hours.regular, dec("24"));
        assert_eq!(summary.site_days, 1);
        assert_eq!(summary.home_days, 1);
        assert_eq!(summary.site_locations, "Tower B");
        assert_eq!(summary.home_projects, "Audit");
        assert_eq!(summary.lunch_hours, dec("0.25"));

        // 1.5 x 0.25 = 0.375 -> 0.38; 1 x 0.5; 2 x 1
        assert_eq!(summary.majorations.ot25, dec("0.38"));
        assert_eq!(summary.majorations.ot50, dec("0.5"));
        assert_eq!(summary.majorations.ot100, dec("2"));
        assert_eq!(summary.majorations.total, dec("2.88"));
        assert_eq!(summary.unjustified_absence_days, dec("23"));
    }

    // ==========================================================================
    // AG-003: Leave counts and paid days
    // ==========================================================================
    #[test]
    fn test_ag_003_leave_split_by_payer() {
        let mut days: Vec<ClassifiedDay> = absent_month("7");
        for day in days.iter_mut().filter(|d| d.is_workday) {
            present(day);
        }
        fn on_leave(code: &'static str) -> impl Fn(&mut ClassifiedDay) {
            move |d| {
                d.status = DayStatus::OnLeave;
                d.leave_type = Some(code.to_string());
                d.presence_fraction = Decimal::ZERO;
                d.hours = HourBuckets::default();
            }
        }
        set_day(&mut days, "2025-03-03", on_leave("CONGE_PAYE"));
        set_day(&mut days, "2025-03-04", on_leave("CONGE_PAYE"));
        set_day(&mut days, "2025-03-05", on_leave("CONGE_MALADIE_COURT"));
        set_day(&mut days, "2025-03-06", on_leave("CONGE_MALADIE"));
        set_day(&mut days, "2025-03-07", on_leave("CONGE_SANS_SOLDE"));

        let summary = summarize_employee("7", &days, &march(), &EngineConfig::standard());

        assert_eq!(summary.leave.employer_paid_days, 2);
        assert_eq!(summary.leave.unpaid_days, 2);
        assert_eq!(summary.leave.social_security_days, 1);
        // 26 - 0 absence - 2 unpaid - 1 social security
        assert_eq!(summary.paid_days, dec("23"));
        assert_eq!(summary.expected_days, 21);
        assert_eq!(
            summary.leave.types_detail,
            "CONGE_MALADIE, CONGE_MALADIE_COURT, CONGE_PAYE, CONGE_SANS_SOLDE"
        );
        assert_eq!(summary.leave.payers_detail, "Employer, None, Social security");
        assert_eq!(
            summary.leave.dates_detail,
            "03/03/2025, 04/03/2025, 05/03/2025, 06/03/2025, 07/03/2025"
        );
        assert_eq!(summary.discipline_score, DisciplineScore::Score(dec("100")));
    }

    #[test]
    fn test_ag_004_whole_month_on_leave_is_undefined() {
        let mut days = absent_month("7");
        for day in days.iter_mut().filter(|d| d.is_workday) {
            day.status = DayStatus::OnLeave;
            day.leave_type = Some("CONGE_MATERNITE".to_string());
            day.presence_fraction = Decimal::ZERO;
            day.partial_absence = None;
        }

        let summary = summarize_employee("7", &days, &march(), &EngineConfig::standard());

        assert_eq!(summary.expected_days, 0);
        assert_eq!(summary.discipline_score, DisciplineScore::Undefined);
        assert_eq!(summary.discipline_score.to_string(), "—");
        assert_eq!(summary.unjustified_absence_days, dec("0"));
    }

    // ==========================================================================
    // AG-005: Half days and lateness
    // ==========================================================================
    #[test]
    fn test_ag_005_half_day_absence_detail() {
        let mut days = absent_month("7");
        for day in days.iter_mut().filter(|d| d.is_workday) {
            present(day);
        }
        set_day(&mut days, "2025-03-12", |d| {
            d.presence_fraction = dec("0.5");
            d.partial_absence = Some(PartialAbsence::Evening);
            d.is_late = true;
        });
        set_day(&mut days, "2025-03-11", |d| d.is_late = true);

        let summary = summarize_employee("7", &days, &march(), &EngineConfig::standard());

        assert_eq!(summary.unjustified_absence_days, dec("0.5"));
        assert_eq!(summary.absence_detail, "12/03/2025 (Evening)");
        assert_eq!(summary.late_count, 2);
        // penalty 2 + 2 = 4 over 26 days
        assert_eq!(summary.discipline_score, DisciplineScore::Score(dec("84.62")));
        assert_eq!(summary.paid_days, dec("25.5"));
    }

    // ==========================================================================
    // AG-006: Row ordering and idempotence
    // ==========================================================================
    #[test]
    fn test_ag_006_rows_sorted_numerically_with_text_first() {
        let ids: Vec<String> = ["100", "20", "abc", "3"].iter().map(|s| s.to_string()).collect();
        let rows = aggregate_month(&ids, &[], &march(), &EngineConfig::standard());

        let order: Vec<&str> = rows.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(order, vec!["abc", "3", "20", "100"]);
        assert!(rows.iter().all(|r| r.total_hours == HourBuckets::default()));
    }

    #[test]
    fn test_ag_007_aggregation_is_idempotent() {
        let days = absent_month("7");
        let ids = vec!["7".to_string()];
        let config = EngineConfig::standard();

        let first = aggregate_month(&ids, &days, &march(), &config);
        let second = aggregate_month(&ids, &days, &march(), &config);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_ag_008_duplicate_ids_produce_one_row() {
        let ids = vec!["7".to_string(), "7".to_string()];
        let rows = aggregate_month(&ids, &[], &march(), &EngineConfig::standard());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_ag_009_interleaved_employees_are_kept_apart() {
        let mut seven = absent_month("7");
        set_day(&mut seven, "2025-03-03", present);
        let eight = absent_month("8");

        let mut days: Vec<ClassifiedDay> = seven
            .iter()
            .zip(eight.iter())
            .flat_map(|(a, b)| [b.clone(), a.clone()])
            .collect();
        days.push(ClassifiedDay {
            employee_id: "99".to_string(),
            ..seven[0].clone()
        });

        let ids = vec!["8".to_string(), "7".to_string()];
        let config = EngineConfig::standard();
        let rows = aggregate_month(&ids, &days, &march(), &config);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], summarize_employee("7", &seven, &march(), &config));
        assert_eq!(rows[1], summarize_employee("8", &eight, &march(), &config));
        assert_eq!(rows[0].unjustified_absence_days, dec("25"));
        assert_eq!(rows[1].unjustified_absence_days, dec("26"));
    }
}
