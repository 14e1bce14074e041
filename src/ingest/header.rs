//! Header row detection.
//!
//! Exports often carry a title block above the real header, so the first
//! few rows are searched for the one whose cells name the expected columns.

use crate::config::IngestionPolicy;

/// One expected column and the keywords that identify its header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Stable column name.
    pub name: &'static str,
    /// Lowercase fragments, any of which identifies the header cell.
    pub keywords: &'static [&'static str],
}

impl ColumnSpec {
    fn matches(&self, cell: &str) -> bool {
        let lowered = cell.trim().to_lowercase();
        !lowered.is_empty() && self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Columns of the punch export.
pub const PUNCH_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        name: "employee_id",
        keywords: &["matr", "id"],
    },
    ColumnSpec {
        name: "timestamp",
        keywords: &["pointage", "date"],
    },
];

/// Columns of the leave table.
pub const LEAVE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        name: "employee_id",
        keywords: &["matr", "id"],
    },
    ColumnSpec {
        name: "leave_type",
        keywords: &["type", "motif"],
    },
    ColumnSpec {
        name: "start_date",
        keywords: &["debut", "début", "start"],
    },
    ColumnSpec {
        name: "end_date",
        keywords: &["fin", "end"],
    },
];

/// Columns of the assignment table.
pub const ASSIGNMENT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        name: "employee_id",
        keywords: &["matr", "id"],
    },
    ColumnSpec {
        name: "date",
        keywords: &["date"],
    },
    ColumnSpec {
        name: "assignment_kind",
        keywords: &["affect", "type"],
    },
    ColumnSpec {
        name: "site_name",
        keywords: &["lieu", "chantier", "site"],
    },
    ColumnSpec {
        name: "home_project",
        keywords: &["projet", "project"],
    },
];

/// A detected header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Index of the header row in the raw table.
    pub row_index: usize,
    /// Cell index of each expected column, in [`ColumnSpec`] order.
    pub columns: Vec<Option<usize>>,
}

impl HeaderMatch {
    /// Number of expected columns found in the header row.
    pub fn hits(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }
}

/// How the columns of a table were located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDetection {
    /// A header row was found.
    Detected(HeaderMatch),
    /// No header row; columns are taken in their expected order from row 0.
    Positional,
}

/// Column positions used to read data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// How the layout was obtained.
    pub detection: HeaderDetection,
    /// Cell index of each expected column, in [`ColumnSpec`] order.
    pub columns: Vec<Option<usize>>,
    /// First data row.
    pub data_start: usize,
}

impl TableLayout {
    /// Reads the cell of the `column`-th expected column from a row.
    pub fn cell<'a>(&self, row: &'a [String], column: usize) -> Option<&'a str> {
        self.columns
            .get(column)
            .copied()
            .flatten()
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
    }
}

fn match_row(row: &[String], columns: &[ColumnSpec]) -> Vec<Option<usize>> {
    let mut mapped = vec![None; columns.len()];
    for (cell_idx, cell) in row.iter().enumerate() {
        let target = columns
            .iter()
            .enumerate()
            .find(|(col_idx, spec)| mapped[*col_idx].is_none() && spec.matches(cell));
        if let Some((col_idx, _)) = target {
            mapped[col_idx] = Some(cell_idx);
        }
    }
    mapped
}

/// Searches the leading rows for a header.
///
/// Each cell maps to the first still-unmapped column whose keywords it
/// contains. The first row reaching `header_min_matches` mapped columns is
/// the header.
///
/// # Example
///
/// ```
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::ingest::{detect_header, PUNCH_COLUMNS};
///
/// let rows = vec![
///     vec!["Export pointeuse".to_string()],
///     vec!["Matricule".to_string(), "Date pointage".to_string()],
///     vec!["12".to_string(), "2025-03-03 08:30".to_string()],
/// ];
/// let header = detect_header(&rows, PUNCH_COLUMNS, EngineConfig::standard().ingestion()).unwrap();
/// assert_eq!(header.row_index, 1);
/// assert_eq!(header.columns, vec![Some(0), Some(1)]);
/// ```
pub fn detect_header(
    rows: &[Vec<String>],
    columns: &[ColumnSpec],
    policy: &IngestionPolicy,
) -> Option<HeaderMatch> {
    let min_matches = policy.header_min_matches.min(columns.len()).max(1);

    rows.iter()
        .take(policy.header_scan_rows)
        .enumerate()
        .map(|(row_index, row)| HeaderMatch {
            row_index,
            columns: match_row(row, columns),
        })
        .find(|header| header.hits() >= min_matches)
}

/// Locates the columns of a table, falling back to positional order.
pub fn layout_table(
    rows: &[Vec<String>],
    columns: &[ColumnSpec],
    policy: &IngestionPolicy,
) -> TableLayout {
    match detect_header(rows, columns, policy) {
        Some(header) => TableLayout {
            columns: header.columns.clone(),
            data_start: header.row_index + 1,
            detection: HeaderDetection::Detected(header),
        },
        None => TableLayout {
            detection: HeaderDetection::Positional,
            columns: (0..columns.len()).map(Some).collect(),
            data_start: 0,
        },
    }
}
