//! Field filler: populates one form instance from one record.
//!
//! Only required fields (the record identifier and numeric counters) fail a
//! record. Comment fields are best effort; a missing comment control means
//! "field not present on this form version" and is recorded as a warning.

use tracing::{debug, warn};

use crate::error::{FieldFillError, PageError};
use crate::infrastructure::FormPage;
use crate::models::mapping::{ChoiceOption, ControlKind, FieldMappingTable};
use crate::models::table::{CellValue, Record};

/// Coerce a cell to an integer the way the destination numeric control
/// expects it: parse as a number, truncate the fraction.
pub fn coerce_numeric(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        CellValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| n.trunc() as i64),
        _ => None,
    }
}

/// First option whose keyword occurs in the lowercased, trimmed cell text.
/// Option order is the priority order; `None` means the choice group is
/// left untouched.
pub fn match_choice<'a>(options: &'a [ChoiceOption], cell_text: &str) -> Option<&'a ChoiceOption> {
    let needle = cell_text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    options
        .iter()
        .find(|option| needle.contains(&option.keyword.to_lowercase()))
}

/// Fills a single form instance. Holds no resources; the page capability is
/// passed in per call.
pub struct FieldFiller<'a> {
    mapping: &'a FieldMappingTable,
}

impl<'a> FieldFiller<'a> {
    pub fn new(mapping: &'a FieldMappingTable) -> Self {
        Self { mapping }
    }

    /// Populate every mapped control from `record`. Returns the warnings
    /// collected from non-required fields; the first required-field failure
    /// aborts the rest of this record's fill.
    pub async fn fill<P: FormPage + ?Sized>(
        &self,
        page: &P,
        record: &Record,
    ) -> Result<Vec<String>, FieldFillError> {
        let mut warnings = Vec::new();

        for entry in self.mapping.entries() {
            let cell = record.cell(&entry.source_column);

            match entry.kind {
                ControlKind::Text => {
                    let Some(control_id) = entry.control_id.as_deref() else {
                        continue;
                    };
                    if cell.is_empty() {
                        continue;
                    }
                    page.set_field(control_id, &cell.as_text())
                        .await
                        .map_err(|e| required_error(&entry.logical_name, control_id, e))?;
                }
                ControlKind::Number => {
                    let Some(control_id) = entry.control_id.as_deref() else {
                        continue;
                    };
                    let value = coerce_numeric(cell).ok_or_else(|| FieldFillError::NotNumeric {
                        field: entry.logical_name.clone(),
                        value: cell.as_text(),
                    })?;
                    page.set_field(control_id, &value.to_string())
                        .await
                        .map_err(|e| required_error(&entry.logical_name, control_id, e))?;
                }
                ControlKind::Choice => {
                    match match_choice(&entry.options, &cell.as_text()) {
                        Some(option) => {
                            page.click_control(&option.control_id)
                                .await
                                .map_err(|e| {
                                    required_error(&entry.logical_name, &option.control_id, e)
                                })?;
                        }
                        None => {
                            debug!(
                                "field '{}': no keyword match for '{}', leaving group untouched",
                                entry.logical_name, cell
                            );
                        }
                    }
                }
                ControlKind::Comment => {
                    let Some(control_id) = entry.control_id.as_deref() else {
                        continue;
                    };
                    if cell.is_empty() {
                        continue;
                    }
                    if let Err(e) = page.set_field(control_id, &cell.as_text()).await {
                        let message = if e.is_control_missing() {
                            format!(
                                "field '{}': control '{}' not present on this form version",
                                entry.logical_name, control_id
                            )
                        } else {
                            format!("field '{}': {}", entry.logical_name, e)
                        };
                        warn!("{}", message);
                        warnings.push(message);
                    }
                }
            }
        }

        Ok(warnings)
    }
}

fn required_error(field: &str, control_id: &str, source: PageError) -> FieldFillError {
    if source.is_control_missing() {
        FieldFillError::ControlNotFound {
            field: field.to_string(),
            control_id: control_id.to_string(),
        }
    } else {
        FieldFillError::Interaction {
            field: field.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion_truncates_and_parses() {
        assert_eq!(coerce_numeric(&CellValue::Number(12.0)), Some(12));
        assert_eq!(coerce_numeric(&CellValue::Number(7.9)), Some(7));
        assert_eq!(coerce_numeric(&CellValue::Text(" 5 ".into())), Some(5));
        assert_eq!(coerce_numeric(&CellValue::Text("5.7".into())), Some(5));
        assert_eq!(coerce_numeric(&CellValue::Text("five".into())), None);
        assert_eq!(coerce_numeric(&CellValue::Text("N/A".into())), None);
        assert_eq!(coerce_numeric(&CellValue::Empty), None);
    }

    fn outcome_options() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption { keyword: "dropped".into(), control_id: "Radio8_1".into() },
            ChoiceOption { keyword: "completed".into(), control_id: "Radio8_2".into() },
            ChoiceOption { keyword: "not continuing".into(), control_id: "Radio8_3".into() },
        ]
    }

    #[test]
    fn choice_matching_is_case_insensitive_substring() {
        let options = outcome_options();
        let hit = match_choice(&options, "  Dropped out of the Program ").unwrap();
        assert_eq!(hit.control_id, "Radio8_1");

        let hit = match_choice(&options, "Completed and continuing").unwrap();
        assert_eq!(hit.control_id, "Radio8_2");

        assert!(match_choice(&options, "no idea").is_none());
        assert!(match_choice(&options, "").is_none());
    }

    #[test]
    fn choice_matching_respects_priority_order() {
        // A cell that mentions both outcomes resolves to the first option.
        let options = outcome_options();
        let hit = match_choice(&options, "dropped out after having completed week one").unwrap();
        assert_eq!(hit.control_id, "Radio8_1");
    }
}
