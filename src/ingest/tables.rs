//! Normalization of raw punch, leave and assignment tables.
//!
//! Each `ingest_*` function locates the columns, coerces every data row
//! into a typed record and reports the rows it had to drop. None of them
//! fail: a table that yields nothing is an empty table.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::config::EngineConfig;
use crate::models::{
    AssignmentKind, AssignmentRecord, AuditWarning, LeaveRecord, Punch, WarningSeverity,
};

use super::header::{
    layout_table, ColumnSpec, HeaderDetection, TableLayout, ASSIGNMENT_COLUMNS, LEAVE_COLUMNS,
    PUNCH_COLUMNS,
};
use super::parse::{non_empty, normalize_employee_id, parse_date, parse_timestamp};

/// A table as read from a spreadsheet: rows of text cells.
pub type RawTable = Vec<Vec<String>>;

/// Records extracted from one raw table.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedTable<T> {
    /// Typed records, in source order unless stated otherwise.
    pub records: Vec<T>,
    /// How the columns were located.
    pub detection: HeaderDetection,
    /// Header and dropped-row warnings.
    pub warnings: Vec<AuditWarning>,
}

struct TableReader<'a> {
    table: &'static str,
    rows: &'a [Vec<String>],
    layout: TableLayout,
    warnings: Vec<AuditWarning>,
}

impl<'a> TableReader<'a> {
    fn new(
        table: &'static str,
        rows: &'a [Vec<String>],
        columns: &[ColumnSpec],
        config: &EngineConfig,
    ) -> Self {
        let layout = layout_table(rows, columns, config.ingestion());
        let mut warnings = Vec::new();
        if layout.detection == HeaderDetection::Positional && !rows.is_empty() {
            warn!(table = table, "No header row detected, reading columns by position");
            warnings.push(AuditWarning::new(
                "HEADER_NOT_DETECTED",
                format!(
                    "{} table: no header row in the first {} rows, columns read by position",
                    table,
                    config.ingestion().header_scan_rows
                ),
                WarningSeverity::Low,
            ));
        }
        Self {
            table,
            rows,
            layout,
            warnings,
        }
    }

    /// Non-blank data rows with their 1-based row number.
    fn data_rows(&self) -> impl Iterator<Item = (usize, &'a [String])> + '_ {
        self.rows
            .iter()
            .enumerate()
            .skip(self.layout.data_start)
            .filter(|(_, row)| row.iter().any(|c| !c.trim().is_empty()))
            .map(|(idx, row)| (idx + 1, row.as_slice()))
    }

    fn cell(&self, row: &'a [String], column: usize) -> Option<&'a str> {
        self.layout.cell(row, column)
    }

    fn drop_row(&mut self, row_number: usize, reason: &str) {
        self.warnings.push(AuditWarning::new(
            "ROW_DROPPED",
            format!("{} table, row {}: {}", self.table, row_number, reason),
            WarningSeverity::Medium,
        ));
    }

    fn finish<T>(self, records: Vec<T>) -> IngestedTable<T> {
        let dropped = self
            .warnings
            .iter()
            .filter(|w| w.code == "ROW_DROPPED")
            .count();
        if dropped > 0 {
            warn!(table = self.table, dropped = dropped, "Rows dropped during ingestion");
        }
        IngestedTable {
            records,
            detection: self.layout.detection,
            warnings: self.warnings,
        }
    }
}

/// Removes punches within `window_minutes` of the prior kept punch of the
/// same employee.
///
/// The result is sorted by employee id, then timestamp.
///
/// # Example
///
/// ```
/// use attendance_engine::ingest::dedupe_punches;
/// use attendance_engine::models::Punch;
/// use chrono::NaiveDateTime;
///
/// let p = |s: &str| Punch {
///     employee_id: "5".to_string(),
///     timestamp: NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap(),
/// };
/// let kept = dedupe_punches(
///     vec![p("2025-03-03 08:30"), p("2025-03-03 08:38"), p("2025-03-03 08:41")],
///     10,
/// );
/// // 08:38 is within 10 minutes of 08:30; 08:41 is 11 minutes after it
/// assert_eq!(kept.len(), 2);
/// ```
pub fn dedupe_punches(mut punches: Vec<Punch>, window_minutes: i64) -> Vec<Punch> {
    punches.sort_by(|a, b| {
        a.employee_id
            .cmp(&b.employee_id)
            .then(a.timestamp.cmp(&b.timestamp))
    });

    let window = Duration::minutes(window_minutes);
    let mut kept: Vec<Punch> = Vec::with_capacity(punches.len());
    for punch in punches {
        let within_window = kept.last().is_some_and(|last| {
            last.employee_id == punch.employee_id && punch.timestamp - last.timestamp <= window
        });
        if !within_window {
            kept.push(punch);
        }
    }
    kept
}

/// Reads the punch export.
///
/// Rows without an employee id or a parseable timestamp are dropped. The
/// kept punches are de-duplicated with [`dedupe_punches`].
pub fn ingest_punches(rows: &[Vec<String>], config: &EngineConfig) -> IngestedTable<Punch> {
    let mut reader = TableReader::new("punches", rows, PUNCH_COLUMNS, config);
    let mut punches = Vec::new();

    let data: Vec<(usize, &[String])> = reader.data_rows().collect();
    for (row_number, row) in data {
        let employee_id = reader.cell(row, 0).and_then(normalize_employee_id);
        let timestamp = reader.cell(row, 1).and_then(parse_timestamp);
        match (employee_id, timestamp) {
            (Some(employee_id), Some(timestamp)) => punches.push(Punch {
                employee_id,
                timestamp,
            }),
            (None, _) => reader.drop_row(row_number, "missing employee id"),
            (_, None) => reader.drop_row(row_number, "unparseable timestamp"),
        }
    }

    let punches = dedupe_punches(punches, config.ingestion().punch_dedup_minutes);
    reader.finish(punches)
}

/// Reads the leave table.
///
/// A missing end date means a single-day leave. Rows ending before they
/// start are dropped, exact duplicates are removed, and each kept record
/// gets its standardized type from the leave rule table.
pub fn ingest_leaves(rows: &[Vec<String>], config: &EngineConfig) -> IngestedTable<LeaveRecord> {
    let mut reader = TableReader::new("leaves", rows, LEAVE_COLUMNS, config);
    let mut seen = HashSet::new();
    let mut leaves = Vec::new();

    let data: Vec<(usize, &[String])> = reader.data_rows().collect();
    for (row_number, row) in data {
        let Some(employee_id) = reader.cell(row, 0).and_then(normalize_employee_id) else {
            reader.drop_row(row_number, "missing employee id");
            continue;
        };
        let Some(start_date) = reader.cell(row, 2).and_then(parse_date) else {
            reader.drop_row(row_number, "unparseable start date");
            continue;
        };
        let end_date = match reader.cell(row, 3).and_then(non_empty) {
            None => start_date,
            Some(text) => match parse_date(&text) {
                Some(date) => date,
                None => {
                    reader.drop_row(row_number, "unparseable end date");
                    continue;
                }
            },
        };
        if end_date < start_date {
            reader.drop_row(row_number, "end date before start date");
            continue;
        }

        let leave_type_raw = reader.cell(row, 1).unwrap_or_default().trim().to_string();
        let record = LeaveRecord {
            standardized_type: config.standardize_leave(&leave_type_raw).code.clone(),
            employee_id,
            leave_type_raw,
            start_date,
            end_date,
        };
        if seen.insert(record.clone()) {
            leaves.push(record);
        }
    }

    reader.finish(leaves)
}

/// Reads the assignment table.
///
/// Rows whose kind cannot be recognized are dropped. When several rows
/// target the same employee-day, the last one wins.
pub fn ingest_assignments(
    rows: &[Vec<String>],
    config: &EngineConfig,
) -> IngestedTable<AssignmentRecord> {
    let mut reader = TableReader::new("assignments", rows, ASSIGNMENT_COLUMNS, config);
    let mut assignments = Vec::new();

    let data: Vec<(usize, &[String])> = reader.data_rows().collect();
    for (row_number, row) in data {
        let Some(employee_id) = reader.cell(row, 0).and_then(normalize_employee_id) else {
            reader.drop_row(row_number, "missing employee id");
            continue;
        };
        let Some(date) = reader.cell(row, 1).and_then(parse_date) else {
            reader.drop_row(row_number, "unparseable date");
            continue;
        };
        let label = reader.cell(row, 2).unwrap_or_default();
        let Some(assignment_kind) = AssignmentKind::parse_label(label) else {
            reader.drop_row(row_number, &format!("unknown assignment '{}'", label.trim()));
            continue;
        };

        assignments.push(AssignmentRecord {
            employee_id,
            date,
            assignment_kind,
            site_name: reader.cell(row, 3).and_then(non_empty),
            home_project: reader.cell(row, 4).and_then(non_empty),
        });
    }

    reader.finish(merge_assignments(assignments, Vec::new()))
}

/// Merges file assignments with manual entries.
///
/// One record is kept per (employee, date): manual entries override file
/// rows, and within a source later rows override earlier ones. The result
/// is sorted by employee id, then date.
pub fn merge_assignments(
    file: Vec<AssignmentRecord>,
    manual: Vec<AssignmentRecord>,
) -> Vec<AssignmentRecord> {
    let mut merged: BTreeMap<(String, NaiveDate), AssignmentRecord> = BTreeMap::new();
    for record in file.into_iter().chain(manual) {
        merged.insert((record.employee_id.clone(), record.date), record);
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn config() -> EngineConfig {
        EngineConfig::standard()
    }

    // ==========================================================================
    // Punches
    // ==========================================================================
    #[test]
    fn test_ingest_punches_with_title_rows() {
        let rows = vec![
            row(&["Export du 01/04/2025"]),
            row(&["Matricule", "Date pointage"]),
            row(&["12.0", "03/03/2025 08:31"]),
            row(&["12", "03/03/2025 18:35:10"]),
            row(&["", ""]),
            row(&["7", "2025-03-03T08:25:00"]),
        ];
        let table = ingest_punches(&rows, &config());

        assert!(matches!(table.detection, HeaderDetection::Detected(_)));
        assert!(table.warnings.is_empty());
        assert_eq!(
            table.records,
            vec![
                Punch {
                    employee_id: "12".to_string(),
                    timestamp: make_datetime("2025-03-03 08:31:00"),
                },
                Punch {
                    employee_id: "12".to_string(),
                    timestamp: make_datetime("2025-03-03 18:35:10"),
                },
                Punch {
                    employee_id: "7".to_string(),
                    timestamp: make_datetime("2025-03-03 08:25:00"),
                },
            ]
        );
    }

    #[test]
    fn test_ingest_punches_drops_bad_rows() {
        let rows = vec![
            row(&["Matricule", "Date"]),
            row(&["12", "not a date"]),
            row(&["", "2025-03-03 08:30"]),
            row(&["12", "2025-03-03 08:30"]),
        ];
        let table = ingest_punches(&rows, &config());

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.warnings.len(), 2);
        assert!(table.warnings.iter().all(|w| w.code == "ROW_DROPPED"));
        assert!(table.warnings[0].message.contains("row 2"));
    }

    #[test]
    fn test_ingest_punches_positional_fallback_warns() {
        let rows = vec![row(&["12", "2025-03-03 08:30"]), row(&["12", "2025-03-03 18:30"])];
        let table = ingest_punches(&rows, &config());

        assert_eq!(table.detection, HeaderDetection::Positional);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].code, "HEADER_NOT_DETECTED");
    }

    #[test]
    fn test_empty_table_has_no_warnings() {
        let table = ingest_punches(&[], &config());
        assert!(table.records.is_empty());
        assert!(table.warnings.is_empty());
    }

    #[test]
    fn test_dedupe_measures_from_last_kept_punch() {
        let p = |id: &str, ts: &str| Punch {
            employee_id: id.to_string(),
            timestamp: make_datetime(ts),
        };
        let kept = dedupe_punches(
            vec![
                p("1", "2025-03-03 08:40:00"),
                p("1", "2025-03-03 08:30:00"),
                p("1", "2025-03-03 08:35:00"),
                p("2", "2025-03-03 08:32:00"),
                p("1", "2025-03-03 08:41:00"),
            ],
            10,
        );
        assert_eq!(
            kept,
            vec![
                p("1", "2025-03-03 08:30:00"),
                p("1", "2025-03-03 08:41:00"),
                p("2", "2025-03-03 08:32:00"),
            ]
        );
    }

    // ==========================================================================
    // Leaves
    // ==========================================================================
    #[test]
    fn test_ingest_leaves_standardizes_and_defaults_end() {
        let rows = vec![
            row(&["Matricule", "Type de congé", "Date début", "Date fin"]),
            row(&["3", "Congé payé", "10/03/2025", "12/03/2025"]),
            row(&["3", "Maladie", "2025-03-20", ""]),
        ];
        let table = ingest_leaves(&rows, &config());

        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].standardized_type, "CONGE_PAYE");
        assert_eq!(table.records[0].end_date, make_date("2025-03-12"));
        assert_eq!(table.records[1].standardized_type, "CONGE_MALADIE");
        assert_eq!(table.records[1].end_date, make_date("2025-03-20"));
    }

    #[test]
    fn test_ingest_leaves_removes_duplicates_and_inverted_spans() {
        let rows = vec![
            row(&["Matricule", "Motif", "Début", "Fin"]),
            row(&["3", "Congé payé", "10/03/2025", "12/03/2025"]),
            row(&["3", "Congé payé", "10/03/2025", "12/03/2025"]),
            row(&["4", "Congé payé", "12/03/2025", "10/03/2025"]),
        ];
        let table = ingest_leaves(&rows, &config());

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.warnings.len(), 1);
        assert!(table.warnings[0].message.contains("end date before start date"));
    }

    #[test]
    fn test_unknown_leave_label_uses_fallback() {
        let rows = vec![
            row(&["Matricule", "Motif", "Début", "Fin"]),
            row(&["3", "Formation externe", "10/03/2025", ""]),
        ];
        let table = ingest_leaves(&rows, &config());
        assert_eq!(table.records[0].standardized_type, "AUTRE");
    }

    // ==========================================================================
    // Assignments
    // ==========================================================================
    #[test]
    fn test_ingest_assignments_parses_kinds() {
        let rows = vec![
            row(&["Matricule", "Date", "Affectation", "Lieu", "Projet"]),
            row(&["9", "03/03/2025", "Chantier", "Tower B", ""]),
            row(&["9", "04/03/2025", "Domicile", "", "Audit"]),
            row(&["9", "05/03/2025", "Chantier et Bureau", "Dock", ""]),
            row(&["9", "06/03/2025", "Vacances?", "", ""]),
        ];
        let table = ingest_assignments(&rows, &config());

        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[0].assignment_kind, AssignmentKind::Site);
        assert_eq!(table.records[0].site_name.as_deref(), Some("Tower B"));
        assert_eq!(table.records[1].assignment_kind, AssignmentKind::Home);
        assert_eq!(table.records[1].home_project.as_deref(), Some("Audit"));
        assert_eq!(table.records[2].assignment_kind, AssignmentKind::SiteAndOffice);
        assert_eq!(table.warnings.len(), 1);
        assert!(table.warnings[0].message.contains("Vacances?"));
    }

    #[test]
    fn test_merge_assignments_manual_wins() {
        let record = |kind: AssignmentKind, site: &str| AssignmentRecord {
            employee_id: "9".to_string(),
            date: make_date("2025-03-03"),
            assignment_kind: kind,
            site_name: Some(site.to_string()),
            home_project: None,
        };
        let merged = merge_assignments(
            vec![record(AssignmentKind::Site, "Tower B")],
            vec![record(AssignmentKind::Office, "HQ")],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].assignment_kind, AssignmentKind::Office);
    }
}
