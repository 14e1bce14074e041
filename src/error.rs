//! Error types for the attendance engine.
//!
//! Only run-level failures are represented here. Malformed input rows are
//! dropped during ingestion and reported as audit warnings instead.

use thiserror::Error;

/// The main error type for the attendance engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::InvalidPeriod { month: 13, year: 2025 };
/// assert_eq!(error.to_string(), "Invalid reporting period: month 13 of 2025");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but breaks a table invariant.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// The requested month/year does not describe a calendar month.
    #[error("Invalid reporting period: month {month} of {year}")]
    InvalidPeriod {
        /// The requested month.
        month: u32,
        /// The requested year.
        year: i32,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
