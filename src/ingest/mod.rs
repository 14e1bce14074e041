//! Tabular ingestion helpers.
//!
//! Turns the raw rows of the punch, leave and assignment exports into the
//! typed tables consumed by the monthly pipeline. Row-level problems never
//! abort a run; they are dropped and reported as audit warnings.

mod header;
mod parse;
mod tables;

pub use header::{
    detect_header, layout_table, ColumnSpec, HeaderDetection, HeaderMatch, TableLayout,
    ASSIGNMENT_COLUMNS, LEAVE_COLUMNS, PUNCH_COLUMNS,
};
pub use parse::{from_serial, non_empty, normalize_employee_id, parse_date, parse_timestamp};
pub use tables::{
    dedupe_punches, ingest_assignments, ingest_leaves, ingest_punches, merge_assignments,
    IngestedTable, RawTable,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculation::AttendanceInputs;
use crate::config::EngineConfig;
use crate::models::AssignmentRecord;

/// The raw tables of one run.
///
/// The leave and assignment exports are optional; a missing table is read
/// as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTables {
    /// Time-clock export.
    pub punches: RawTable,
    /// Leave export.
    #[serde(default)]
    pub leaves: Option<RawTable>,
    /// Assignment export.
    #[serde(default)]
    pub assignments: Option<RawTable>,
}

/// Normalizes the raw tables and merges manual assignments.
///
/// # Example
///
/// ```
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::ingest::{ingest_tables, RawTables};
///
/// let row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
/// let tables = RawTables {
///     punches: vec![
///         row(&["Matricule", "Date pointage"]),
///         row(&["8", "03/03/2025 08:30"]),
///         row(&["8", "03/03/2025 08:34"]),
///     ],
///     ..RawTables::default()
/// };
///
/// let inputs = ingest_tables(&tables, Vec::new(), &EngineConfig::standard());
/// assert_eq!(inputs.punches.len(), 1);
/// assert!(inputs.warnings.is_empty());
/// ```
pub fn ingest_tables(
    tables: &RawTables,
    manual_assignments: Vec<AssignmentRecord>,
    config: &EngineConfig,
) -> AttendanceInputs {
    let punches = ingest_punches(&tables.punches, config);
    let leaves = ingest_leaves(tables.leaves.as_deref().unwrap_or_default(), config);
    let assignments = ingest_assignments(tables.assignments.as_deref().unwrap_or_default(), config);

    debug!(
        punches = punches.records.len(),
        leaves = leaves.records.len(),
        assignments = assignments.records.len(),
        manual_assignments = manual_assignments.len(),
        "Input tables normalized"
    );

    let mut warnings = punches.warnings;
    warnings.extend(leaves.warnings);
    warnings.extend(assignments.warnings);

    AttendanceInputs {
        punches: punches.records,
        leaves: leaves.records,
        assignments: merge_assignments(assignments.records, manual_assignments),
        warnings,
    }
}
