//! Reporting period model.
//!
//! A [`ReportingPeriod`] is one calendar month plus the holidays declared
//! for it. Every employee gets one classified day per date of the period.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One calendar month and its declared holidays.
///
/// # Example
///
/// ```
/// use attendance_engine::models::ReportingPeriod;
/// use chrono::NaiveDate;
///
/// let period = ReportingPeriod::new(3, 2025, vec![NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()]).unwrap();
///
/// assert_eq!(period.days().count(), 31);
/// assert!(period.is_holiday(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()));
/// assert!(!period.is_workday(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())); // Sunday
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    /// Month number (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Declared holidays.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl ReportingPeriod {
    /// Creates a period, rejecting month numbers outside 1-12.
    pub fn new(month: u32, year: i32, holidays: Vec<NaiveDate>) -> EngineResult<Self> {
        let period = Self {
            month,
            year,
            holidays,
        };
        period.first_day()?;
        Ok(period)
    }

    /// Returns the first day of the month.
    pub fn first_day(&self) -> EngineResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(EngineError::InvalidPeriod {
            month: self.month,
            year: self.year,
        })
    }

    /// Iterates every date of the month in order.
    ///
    /// Yields nothing for an invalid month.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first_day()
            .ok()
            .into_iter()
            .flat_map(|first| first.iter_days())
            .take_while(move |d| d.month() == self.month && d.year() == self.year)
    }

    /// Checks if a date is a declared holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Checks if a date is an eligible workday (not Sunday, not a holiday).
    pub fn is_workday(&self, date: NaiveDate) -> bool {
        date.weekday() != Weekday::Sun && !self.is_holiday(date)
    }

    /// Counts the eligible workdays of the month.
    pub fn eligible_workdays(&self) -> u32 {
        self.days().filter(|d| self.is_workday(*d)).count() as u32
    }
}
