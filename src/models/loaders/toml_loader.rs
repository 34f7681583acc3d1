//! TOML loaders for input tables and mapping override files.
//!
//! The input boundary expects headers and row keys already trimmed; that
//! normalization happens here so the engine never sees ragged headers
//! (trailing spaces in spreadsheet exports are the most common cause of
//! column mismatches).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;
use toml::Value;

use crate::models::mapping::FieldOverride;
use crate::models::table::{CellValue, DataTable, Record};

/// On-disk shape of an input table:
///
/// ```toml
/// columns = ["Evaluator Name", "Customer Interviews Completed"]
///
/// [[rows]]
/// "Evaluator Name" = "Jane Doe"
/// "Customer Interviews Completed" = 12
/// ```
#[derive(Debug, Deserialize)]
struct RawTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<toml::value::Table>,
}

/// On-disk shape of a mapping override file:
///
/// ```toml
/// [fields."Evaluator Name"]
/// control_id = "SingleLine9-arialabel"
///
/// [fields."Program Outcome"]
/// options = [{ keyword = "dropped", control_id = "Radio9_1" }]
/// ```
#[derive(Debug, Deserialize)]
struct OverridesFile {
    #[serde(default)]
    fields: HashMap<String, FieldOverride>,
}

fn cell_from_value(value: &Value) -> CellValue {
    match value {
        Value::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Value::Integer(i) => CellValue::Number(*i as f64),
        Value::Float(f) => CellValue::Number(*f),
        other => CellValue::Text(other.to_string()),
    }
}

/// Load and normalize a tabular dataset from a TOML file.
pub async fn load_data_table(path: &Path) -> Result<DataTable> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read table file: {}", path.display()))?;

    let raw: RawTable = toml::from_str(&content)
        .with_context(|| format!("failed to parse table file: {}", path.display()))?;

    let columns: Vec<String> = raw.columns.iter().map(|c| c.trim().to_string()).collect();

    let rows = raw
        .rows
        .into_iter()
        .map(|table| {
            let mut record = Record::new();
            for (key, value) in &table {
                record.insert(key.trim(), cell_from_value(value));
            }
            record
        })
        .collect();

    Ok(DataTable { columns, rows })
}

/// Load per-deployment mapping overrides from a TOML file.
pub async fn load_mapping_overrides(path: &Path) -> Result<HashMap<String, FieldOverride>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read override file: {}", path.display()))?;

    let parsed: OverridesFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse override file: {}", path.display()))?;

    Ok(parsed.fields)
}
