//! Cell-level parsing for spreadsheet exports.
//!
//! Cells arrive as text. Dates may be ISO, day-first (`dd/mm/yyyy`), or
//! spreadsheet serial numbers; employee ids may carry float artefacts.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Largest serial accepted (31/12/9999).
const MAX_SERIAL: f64 = 2_958_465.0;

fn serial_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Converts a spreadsheet serial number (days since 1899-12-30, with the
/// time of day as the fraction) to a timestamp.
///
/// # Example
///
/// ```
/// use attendance_engine::ingest::from_serial;
///
/// let ts = from_serial(45719.5).unwrap();
/// assert_eq!(ts.to_string(), "2025-03-03 12:00:00");
/// ```
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }
    let seconds = (serial * 86_400.0).round() as i64;
    serial_epoch()?.checked_add_signed(Duration::seconds(seconds))
}

/// Parses a timestamp cell.
///
/// Date-only cells are read as midnight.
///
/// # Example
///
/// ```
/// use attendance_engine::ingest::parse_timestamp;
///
/// assert_eq!(
///     parse_timestamp("03/03/2025 08:27").unwrap().to_string(),
///     "2025-03-03 08:27:00"
/// );
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let text = cell.trim();
    if text.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .or_else(|| text.parse::<f64>().ok().and_then(from_serial))
}

/// Parses a date cell. A time part, if present, is ignored.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    parse_timestamp(cell).map(|ts| ts.date())
}

/// Normalizes an employee id cell.
///
/// Whitespace is trimmed and integral float renderings (`"123.0"`) lose
/// their fraction. Empty cells yield `None`.
///
/// # Example
///
/// ```
/// use attendance_engine::ingest::normalize_employee_id;
///
/// assert_eq!(normalize_employee_id(" 123.0 "), Some("123".to_string()));
/// assert_eq!(normalize_employee_id("A-17"), Some("A-17".to_string()));
/// assert_eq!(normalize_employee_id("  "), None);
/// ```
pub fn normalize_employee_id(cell: &str) -> Option<String> {
    let text = cell.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((integer, fraction)) = text.split_once('.') {
        let is_integral_float = !integer.is_empty()
            && integer.chars().all(|c| c.is_ascii_digit())
            && !fraction.is_empty()
            && fraction.chars().all(|c| c == '0');
        if is_integral_float {
            return Some(integer.to_string());
        }
    }

    Some(text.to_string())
}

/// Returns a trimmed cell, or `None` when it is blank.
pub fn non_empty(cell: &str) -> Option<String> {
    let text = cell.trim();
    (!text.is_empty()).then(|| text.to_string())
}
