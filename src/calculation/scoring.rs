//! Discipline score calculation.
//!
//! The score starts at 100 and loses the net penalty points normalized by
//! the expected working days:
//!
//! ```text
//! penalty = late_penalty × late_count + absence_penalty × absence_days
//! net     = max(0, penalty − total_majorations)
//! score   = clip(100 − net / expected_days × 100, 0, 100)
//! ```

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::DisciplineScore;

/// Computes the discipline score of one employee-month.
///
/// Returns [`DisciplineScore::Undefined`] when `expected_days <= 0`.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::discipline_score;
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::models::DisciplineScore;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::standard();
///
/// // 2 late days, no absence, 0.5 majoration bonus, 20 expected days
/// let score = discipline_score(2, Decimal::ZERO, Decimal::new(5, 1), 20, config.payroll());
/// assert_eq!(score, DisciplineScore::Score(Decimal::new(9250, 2)));
///
/// let score = discipline_score(0, Decimal::ZERO, Decimal::ZERO, 0, config.payroll());
/// assert_eq!(score, DisciplineScore::Undefined);
/// ```
pub fn discipline_score(
    late_count: u32,
    unjustified_absence_days: Decimal,
    majorations_total: Decimal,
    expected_days: i64,
    payroll: &PayrollPolicy,
) -> DisciplineScore {
    if expected_days <= 0 {
        return DisciplineScore::Undefined;
    }

    let hundred = Decimal::ONE_HUNDRED;
    let penalty = payroll.late_penalty_points * Decimal::from(late_count)
        + payroll.absence_penalty_points * unjustified_absence_days;
    let net = (penalty - majorations_total).max(Decimal::ZERO);

    let score = hundred - net / Decimal::from(expected_days) * hundred;
    DisciplineScore::Score(score.clamp(Decimal::ZERO, hundred).round_dp(2))
}
