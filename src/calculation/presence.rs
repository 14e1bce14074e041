//! Day presence evaluation.
//!
//! Punches of one employee-day are paired consecutively into worked
//! intervals. Coverage of the morning and afternoon blocks decides the
//! attendance fraction.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PresencePolicy;
use crate::models::PartialAbsence;

use super::day_detection::at;

/// A worked interval built from two consecutive punches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchPair {
    /// Clock-in.
    pub start: NaiveDateTime,
    /// Clock-out.
    pub end: NaiveDateTime,
}

impl PunchPair {
    fn overlaps(&self, block_start: NaiveDateTime, block_end: NaiveDateTime) -> bool {
        self.start < block_end && self.end > block_start
    }
}

/// Sorts punches and pairs them consecutively (1-2, 3-4, ...).
///
/// Returns the pairs and the trailing unmatched punch, if any.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::pair_punches;
/// use chrono::NaiveDateTime;
///
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let (pairs, orphan) = pair_punches(&[
///     t("2025-03-03 18:30"),
///     t("2025-03-03 08:30"),
///     t("2025-03-03 21:00"),
/// ]);
///
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(pairs[0].start, t("2025-03-03 08:30"));
/// assert_eq!(orphan, Some(t("2025-03-03 21:00")));
/// ```
pub fn pair_punches(punches: &[NaiveDateTime]) -> (Vec<PunchPair>, Option<NaiveDateTime>) {
    let mut sorted = punches.to_vec();
    sorted.sort();

    let mut chunks = sorted.chunks_exact(2);
    let pairs = chunks
        .by_ref()
        .map(|chunk| PunchPair {
            start: chunk[0],
            end: chunk[1],
        })
        .collect();
    let orphan = chunks.remainder().first().copied();

    (pairs, orphan)
}

/// The attendance decision for one employee-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvaluation {
    /// Attendance fraction: 0, 0.5 or 1.
    pub fraction: Decimal,
    /// The missing part of the day; `None` when fully present.
    pub partial_absence: Option<PartialAbsence>,
    /// Worked intervals, in time order.
    pub pairs: Vec<PunchPair>,
    /// Trailing punch without a partner.
    pub orphan: Option<NaiveDateTime>,
}

/// Decides the attendance fraction of one employee-day.
///
/// A block is covered when any punch pair overlaps it. A lone trailing punch
/// covers the morning block when it falls inside it, and the afternoon block
/// when it falls at or after the afternoon start.
///
/// Saturday and Sunday only have the morning block: the fraction is 1 or 0.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::evaluate_presence;
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::models::PartialAbsence;
/// use chrono::{NaiveDate, NaiveDateTime};
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::standard();
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
///
/// let result = evaluate_presence(
///     &[t("2025-03-03 08:25"), t("2025-03-03 12:35")],
///     date,
///     config.presence(),
/// );
///
/// assert_eq!(result.fraction, Decimal::new(5, 1));
/// assert_eq!(result.partial_absence, Some(PartialAbsence::Evening));
/// ```
pub fn evaluate_presence(
    punches: &[NaiveDateTime],
    date: NaiveDate,
    policy: &PresencePolicy,
) -> PresenceEvaluation {
    let (pairs, orphan) = pair_punches(punches);

    let pair_covers = |block_start: NaiveTime, block_end: NaiveTime| {
        let (s, e) = (at(date, block_start), at(date, block_end));
        pairs.iter().any(|p| p.overlaps(s, e))
    };
    let orphan_time = orphan.filter(|o| o.date() == date).map(|o| o.time());

    let morning = pair_covers(policy.morning_start, policy.morning_end)
        || orphan_time.is_some_and(|t| t >= policy.morning_start && t <= policy.morning_end);

    let (fraction, partial_absence) = match policy.afternoon_block(date.weekday()) {
        None => {
            if morning {
                (Decimal::ONE, None)
            } else {
                (Decimal::ZERO, Some(PartialAbsence::FullDaySaturday))
            }
        }
        Some((afternoon_start, afternoon_end)) => {
            let afternoon = pair_covers(afternoon_start, afternoon_end)
                || orphan_time.is_some_and(|t| t >= afternoon_start);
            let half = Decimal::new(5, 1);
            match (morning, afternoon) {
                (true, true) => (Decimal::ONE, None),
                (true, false) => (half, Some(PartialAbsence::Evening)),
                (false, true) => (half, Some(PartialAbsence::Morning)),
                (false, false) => (Decimal::ZERO, Some(PartialAbsence::FullDay)),
            }
        }
    };

    PresenceEvaluation {
        fraction,
        partial_absence,
        pairs,
        orphan,
    }
}
