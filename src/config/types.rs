//! Configuration types for attendance classification.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML files of a configuration directory.

use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed working-time windows used by the overtime calculator and classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    /// Theoretical start of the working day.
    pub day_start: NaiveTime,
    /// Minutes after `day_start` before a first punch counts as late.
    pub late_tolerance_minutes: i64,
    /// Regular hours quota shared by all punch pairs of one weekday.
    pub daily_regular_hours: Decimal,
    /// Start of the night window (evening side).
    pub night_start: NaiveTime,
    /// End of the night window (next morning).
    pub night_end: NaiveTime,
    /// Saturday regular hours stop accruing at this time.
    pub saturday_cutoff: NaiveTime,
    /// Start of the unpaid lunch window.
    pub lunch_start: NaiveTime,
    /// End of the unpaid lunch window, Monday to Thursday.
    pub lunch_end_mon_thu: NaiveTime,
    /// End of the unpaid lunch window on Friday.
    pub lunch_end_friday: NaiveTime,
    /// Theoretical end of the working day, Monday to Thursday.
    pub day_end_mon_thu: NaiveTime,
    /// Theoretical end of the working day on Friday.
    pub day_end_friday: NaiveTime,
}

impl SchedulePolicy {
    /// Returns the unpaid lunch window for a weekday, if that day has one.
    pub fn lunch_window(&self, weekday: Weekday) -> Option<(NaiveTime, NaiveTime)> {
        match weekday {
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => {
                Some((self.lunch_start, self.lunch_end_mon_thu))
            }
            Weekday::Fri => Some((self.lunch_start, self.lunch_end_friday)),
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    /// Returns the theoretical shift used to credit assignment days.
    pub fn theoretical_shift(&self, weekday: Weekday) -> (NaiveTime, NaiveTime) {
        match weekday {
            Weekday::Fri => (self.day_start, self.day_end_friday),
            Weekday::Sat => (self.day_start, self.saturday_cutoff),
            _ => (self.day_start, self.day_end_mon_thu),
        }
    }
}

/// Half-day blocks used to decide attendance fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresencePolicy {
    /// Start of the morning block.
    pub morning_start: NaiveTime,
    /// End of the morning block.
    pub morning_end: NaiveTime,
    /// Start of the afternoon block, Monday to Thursday.
    pub afternoon_start_mon_thu: NaiveTime,
    /// End of the afternoon block, Monday to Thursday.
    pub afternoon_end_mon_thu: NaiveTime,
    /// Start of the afternoon block on Friday.
    pub afternoon_start_friday: NaiveTime,
    /// End of the afternoon block on Friday.
    pub afternoon_end_friday: NaiveTime,
}

impl PresencePolicy {
    /// Returns the afternoon block for a weekday. Weekends have none.
    pub fn afternoon_block(&self, weekday: Weekday) -> Option<(NaiveTime, NaiveTime)> {
        match weekday {
            Weekday::Fri => Some((self.afternoon_start_friday, self.afternoon_end_friday)),
            Weekday::Sat | Weekday::Sun => None,
            _ => Some((self.afternoon_start_mon_thu, self.afternoon_end_mon_thu)),
        }
    }
}

/// Premium weights applied to each overtime tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorationRates {
    /// Weight of the 25% tier.
    pub ot25: Decimal,
    /// Weight of the 50% tier.
    pub ot50: Decimal,
    /// Weight of the 100% tier.
    pub ot100: Decimal,
}

/// Monthly aggregation and scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollPolicy {
    /// Paid-day allotment before deductions.
    pub base_paid_days: u32,
    /// Overtime premium weights.
    pub majoration_rates: MajorationRates,
    /// Discipline penalty per late day.
    pub late_penalty_points: Decimal,
    /// Discipline penalty per unjustified absence day.
    pub absence_penalty_points: Decimal,
}

/// Constants for the tabular ingestion helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionPolicy {
    /// Punches within this many minutes of the prior kept punch are discarded.
    pub punch_dedup_minutes: i64,
    /// Number of leading rows searched for a header.
    pub header_scan_rows: usize,
    /// Minimum keyword hits for a row to be taken as the header.
    pub header_min_matches: usize,
}

/// Contents of `policy.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Working-time windows.
    pub schedule: SchedulePolicy,
    /// Presence blocks.
    pub presence: PresencePolicy,
    /// Aggregation and scoring constants.
    pub payroll: PayrollPolicy,
    /// Ingestion constants.
    pub ingestion: IngestionPolicy,
}

/// Who pays for a leave day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payer {
    /// Paid by the employer.
    Employer,
    /// Paid by the social security fund.
    SocialSecurity,
    /// Not paid at all.
    None,
    /// Payer could not be determined.
    Unknown,
}

impl std::fmt::Display for Payer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payer::Employer => write!(f, "Employer"),
            Payer::SocialSecurity => write!(f, "Social security"),
            Payer::None => write!(f, "None"),
            Payer::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Replacement rule applied when a leave span is shorter than a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortVariant {
    /// Code of the rule that replaces the matched one.
    pub code: String,
    /// Spans with fewer eligible days than this are relabeled.
    pub below_eligible_days: usize,
}

/// One entry of the leave rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRule {
    /// Standardized leave type code (e.g. "CONGE_MALADIE").
    pub code: String,
    /// Human readable label.
    pub label: String,
    /// Lower-case keywords searched in the raw leave label.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Maximum number of days of one span that count as leave.
    pub max_days_counted: usize,
    /// Who pays for the leave.
    pub payer: Payer,
    /// Whether the leave day is paid.
    pub is_paid: bool,
    /// Counts every calendar day, including Sundays and holidays.
    #[serde(default)]
    pub counts_calendar_days: bool,
    /// Relabeling applied to short spans.
    #[serde(default)]
    pub short_variant: Option<ShortVariant>,
    /// The rule used when no keyword matches.
    #[serde(default)]
    pub fallback: bool,
}

impl LeaveRule {
    /// Returns true if any keyword occurs in the (lower-cased) raw label.
    pub fn matches(&self, raw_label: &str) -> bool {
        let lowered = raw_label.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Contents of `leave_rules.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRuleTable {
    /// Rules in matching order.
    pub rules: Vec<LeaveRule>,
}

/// The complete engine configuration.
///
/// Built once at start-up and passed explicitly into every component.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    policy: PolicyConfig,
    leave_rules: Vec<LeaveRule>,
    fallback_index: usize,
}

impl EngineConfig {
    /// Creates a configuration after checking the leave table invariants.
    ///
    /// Leave keywords are lower-cased so they match any label casing.
    /// The table must contain exactly one fallback rule, unique codes, and
    /// every short variant must point to an existing rule.
    pub fn new(
        policy: PolicyConfig,
        mut leave_rules: Vec<LeaveRule>,
    ) -> crate::error::EngineResult<Self> {
        use crate::error::EngineError;

        for rule in &mut leave_rules {
            for keyword in &mut rule.keywords {
                *keyword = keyword.to_lowercase();
            }
        }

        let fallbacks: Vec<usize> = leave_rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.fallback)
            .map(|(i, _)| i)
            .collect();
        let fallback_index = match fallbacks.as_slice() {
            [only] => *only,
            other => {
                return Err(EngineError::InvalidConfig {
                    message: format!(
                        "leave rule table must contain exactly one fallback rule, found {}",
                        other.len()
                    ),
                });
            }
        };

        let mut seen = std::collections::HashSet::new();
        for rule in &leave_rules {
            if !seen.insert(rule.code.as_str()) {
                return Err(EngineError::InvalidConfig {
                    message: format!("duplicate leave rule code '{}'", rule.code),
                });
            }
        }

        for rule in &leave_rules {
            if let Some(variant) = &rule.short_variant {
                if !leave_rules.iter().any(|r| r.code == variant.code) {
                    return Err(EngineError::InvalidConfig {
                        message: format!(
                            "rule '{}' refers to unknown short variant '{}'",
                            rule.code, variant.code
                        ),
                    });
                }
            }
        }

        Ok(Self {
            policy,
            leave_rules,
            fallback_index,
        })
    }

    /// Returns the built-in standard configuration.
    ///
    /// Mirrors `config/standard/*.yaml` for callers that ship no files.
    pub fn standard() -> Self {
        let leave_rules = standard_leave_rules();
        let fallback_index = leave_rules
            .iter()
            .position(|r| r.fallback)
            .unwrap_or(leave_rules.len() - 1);
        Self {
            policy: standard_policy(),
            leave_rules,
            fallback_index,
        }
    }

    /// Returns the working-time windows.
    pub fn schedule(&self) -> &SchedulePolicy {
        &self.policy.schedule
    }

    /// Returns the presence blocks.
    pub fn presence(&self) -> &PresencePolicy {
        &self.policy.presence
    }

    /// Returns the aggregation and scoring constants.
    pub fn payroll(&self) -> &PayrollPolicy {
        &self.policy.payroll
    }

    /// Returns the ingestion constants.
    pub fn ingestion(&self) -> &IngestionPolicy {
        &self.policy.ingestion
    }

    /// Returns the leave rules in matching order.
    pub fn leave_rules(&self) -> &[LeaveRule] {
        &self.leave_rules
    }

    /// Returns the fallback ("other") leave rule.
    pub fn fallback_rule(&self) -> &LeaveRule {
        &self.leave_rules[self.fallback_index]
    }

    /// Looks up a rule by its standardized code.
    pub fn leave_rule(&self, code: &str) -> Option<&LeaveRule> {
        self.leave_rules.iter().find(|r| r.code == code)
    }

    /// Resolves a raw leave label to a standardized rule.
    ///
    /// Rules are tried in table order; the fallback rule always matches.
    pub fn standardize_leave(&self, raw_label: &str) -> &LeaveRule {
        self.leave_rules
            .iter()
            .find(|r| !r.fallback && r.matches(raw_label))
            .unwrap_or_else(|| self.fallback_rule())
    }
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

fn standard_policy() -> PolicyConfig {
    PolicyConfig {
        schedule: SchedulePolicy {
            day_start: time(8, 30),
            late_tolerance_minutes: 20,
            daily_regular_hours: Decimal::new(8, 0),
            night_start: time(21, 0),
            night_end: time(6, 0),
            saturday_cutoff: time(12, 30),
            lunch_start: time(12, 30),
            lunch_end_mon_thu: time(14, 30),
            lunch_end_friday: time(15, 0),
            day_end_mon_thu: time(18, 30),
            day_end_friday: time(19, 0),
        },
        presence: PresencePolicy {
            morning_start: time(8, 30),
            morning_end: time(12, 30),
            afternoon_start_mon_thu: time(14, 30),
            afternoon_end_mon_thu: time(18, 30),
            afternoon_start_friday: time(15, 0),
            afternoon_end_friday: time(19, 0),
        },
        payroll: PayrollPolicy {
            base_paid_days: 26,
            majoration_rates: MajorationRates {
                ot25: Decimal::new(25, 2),
                ot50: Decimal::new(50, 2),
                ot100: Decimal::new(100, 2),
            },
            late_penalty_points: Decimal::ONE,
            absence_penalty_points: Decimal::new(4, 0),
        },
        ingestion: IngestionPolicy {
            punch_dedup_minutes: 10,
            header_scan_rows: 5,
            header_min_matches: 2,
        },
    }
}

fn rule(
    code: &str,
    label: &str,
    keywords: &[&str],
    max_days_counted: usize,
    payer: Payer,
    is_paid: bool,
) -> LeaveRule {
    LeaveRule {
        code: code.to_string(),
        label: label.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        max_days_counted,
        payer,
        is_paid,
        counts_calendar_days: false,
        short_variant: None,
        fallback: false,
    }
}

fn standard_leave_rules() -> Vec<LeaveRule> {
    vec![
        rule(
            "CONGE_SANS_SOLDE",
            "Unpaid leave",
            &["sans solde", "non payé", "non paye"],
            999,
            Payer::None,
            false,
        ),
        LeaveRule {
            counts_calendar_days: true,
            ..rule(
                "CONGE_MATERNITE",
                "Maternity leave",
                &["maternité", "maternite"],
                98,
                Payer::SocialSecurity,
                true,
            )
        },
        rule(
            "CONGE_PAYE",
            "Annual paid leave",
            &["annuel", "payé"],
            18,
            Payer::Employer,
            true,
        ),
        LeaveRule {
            short_variant: Some(ShortVariant {
                code: "CONGE_MALADIE_COURT".to_string(),
                below_eligible_days: 4,
            }),
            ..rule(
                "CONGE_MALADIE",
                "Sick leave",
                &["maladie", "medical"],
                180,
                Payer::SocialSecurity,
                true,
            )
        },
        rule(
            "CONGE_MALADIE_COURT",
            "Short sick leave",
            &[],
            3,
            Payer::None,
            false,
        ),
        rule(
            "CONGE_MARIAGE",
            "Marriage leave",
            &["mariage"],
            4,
            Payer::Employer,
            true,
        ),
        rule(
            "CONGE_PATERNITE",
            "Paternity leave",
            &["paternité", "naissance"],
            3,
            Payer::Employer,
            true,
        ),
        rule(
            "CONGE_DECES",
            "Bereavement leave",
            &["décès", "deces"],
            3,
            Payer::Employer,
            true,
        ),
        LeaveRule {
            fallback: true,
            ..rule("AUTRE", "Other leave", &[], 999, Payer::Unknown, false)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_config_has_single_fallback() {
        let config = EngineConfig::standard();
        assert_eq!(config.fallback_rule().code, "AUTRE");
        assert_eq!(
            config.leave_rules().iter().filter(|r| r.fallback).count(),
            1
        );
    }

    #[test]
    fn test_standardize_sick_leave_keyword() {
        let config = EngineConfig::standard();
        assert_eq!(
            config.standardize_leave("Congé Maladie").code,
            "CONGE_MALADIE"
        );
    }

    #[test]
    fn test_standardize_unpaid_before_paid() {
        let config = EngineConfig::standard();
        assert_eq!(
            config.standardize_leave("Congé non payé").code,
            "CONGE_SANS_SOLDE"
        );
        assert_eq!(config.standardize_leave("Congé payé").code, "CONGE_PAYE");
    }

    #[test]
    fn test_standardize_unknown_falls_back() {
        let config = EngineConfig::standard();
        assert_eq!(config.standardize_leave("formation").code, "AUTRE");
        assert_eq!(config.standardize_leave("").code, "AUTRE");
    }

    #[test]
    fn test_short_sick_rule_never_matches_by_keyword() {
        let config = EngineConfig::standard();
        let short = config.leave_rule("CONGE_MALADIE_COURT").unwrap();
        assert!(!short.matches("maladie courte"));
    }

    #[test]
    fn test_new_lowercases_keywords() {
        let mut rules = standard_leave_rules();
        let sick = rules
            .iter_mut()
            .find(|r| r.code == "CONGE_MALADIE")
            .unwrap();
        sick.keywords = vec!["MALADIE".to_string()];

        let config = EngineConfig::new(standard_policy(), rules).unwrap();

        assert_eq!(
            config.leave_rule("CONGE_MALADIE").unwrap().keywords,
            vec!["maladie".to_string()]
        );
        assert_eq!(
            config.standardize_leave("Arrêt Maladie").code,
            "CONGE_MALADIE"
        );
    }

    #[test]
    fn test_new_rejects_missing_fallback() {
        let rules: Vec<LeaveRule> = standard_leave_rules()
            .into_iter()
            .filter(|r| !r.fallback)
            .collect();
        let result = EngineConfig::new(standard_policy(), rules);
        assert!(matches!(
            result,
            Err(crate::error::EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_new_rejects_dangling_short_variant() {
        let rules: Vec<LeaveRule> = standard_leave_rules()
            .into_iter()
            .filter(|r| r.code != "CONGE_MALADIE_COURT")
            .collect();
        let result = EngineConfig::new(standard_policy(), rules);
        assert!(result.is_err());
    }

    #[test]
    fn test_lunch_window_by_weekday() {
        let schedule = standard_policy().schedule;
        assert_eq!(
            schedule.lunch_window(Weekday::Mon),
            Some((time(12, 30), time(14, 30)))
        );
        assert_eq!(
            schedule.lunch_window(Weekday::Fri),
            Some((time(12, 30), time(15, 0)))
        );
        assert_eq!(schedule.lunch_window(Weekday::Sat), None);
    }

    #[test]
    fn test_theoretical_shift_by_weekday() {
        let schedule = standard_policy().schedule;
        assert_eq!(
            schedule.theoretical_shift(Weekday::Wed),
            (time(8, 30), time(18, 30))
        );
        assert_eq!(
            schedule.theoretical_shift(Weekday::Fri),
            (time(8, 30), time(19, 0))
        );
        assert_eq!(
            schedule.theoretical_shift(Weekday::Sat),
            (time(8, 30), time(12, 30))
        );
    }
}
