//! Tabular input data as handed over by the external loader.
//!
//! The engine only reads these types. Ownership of the source table stays
//! with the caller; a batch pass never mutates it.

use std::collections::HashMap;
use std::fmt;

/// One raw cell as loaded from the source table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The raw string form typed into text controls. Numbers keep their
    /// shortest representation (`5`, not `5.0`, for whole values).
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Empty => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// One logical evaluation entry: source column → raw cell value.
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: HashMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.values.insert(column.into(), value);
    }

    /// Cell for a source column; absent columns read as empty.
    pub fn cell(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&CellValue::Empty)
    }
}

/// An ordered sequence of records processed as one run.
pub type Batch = Vec<Record>;

/// Headers plus rows, headers already whitespace-trimmed by the loader.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl DataTable {
    /// The set of column headers present, for mapping validation.
    pub fn column_set(&self) -> std::collections::HashSet<String> {
        self.columns.iter().cloned().collect()
    }

    /// Rows whose trimmed cell in `column` equals `value`. Used for the
    /// team subset selection performed outside the engine.
    pub fn filter_rows(&self, column: &str, value: &str) -> Batch {
        self.rows
            .iter()
            .filter(|row| row.cell(column).as_text().trim() == value)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_cells_render_without_trailing_fraction() {
        assert_eq!(CellValue::Number(5.0).as_text(), "5");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
    }

    #[test]
    fn absent_column_reads_as_empty() {
        let record = Record::new();
        assert!(record.cell("anything").is_empty());
    }

    #[test]
    fn filter_rows_trims_cell_values() {
        let mut row = Record::new();
        row.insert("Team/Project Name", CellValue::Text("  Acme  ".into()));
        let table = DataTable {
            columns: vec!["Team/Project Name".into()],
            rows: vec![row],
        };
        assert_eq!(table.filter_rows("Team/Project Name", "Acme").len(), 1);
        assert_eq!(table.filter_rows("Team/Project Name", "Other").len(), 0);
    }
}
