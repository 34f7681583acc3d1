//! Field mapping table: logical fields → source columns → form controls.
//!
//! The built-in table targets the Great Lakes I-Corps Course Evaluation
//! form. Control ids and choice keywords can be overridden per deployment
//! from a TOML file, so a form revision does not require a rebuild.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ColumnMismatchError;

/// How a cell value is written into its destination control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    /// Plain text input, raw string value. Required field.
    Text,
    /// Numeric input: cell coerced to a number, truncated to an integer.
    /// Required field.
    Number,
    /// Radio-style group: the first option whose keyword matches the
    /// lowercased cell text is clicked; no match leaves the group untouched.
    Choice,
    /// Free-text comment area, best effort. A missing control is tolerated
    /// ("field not present on this form version").
    Comment,
}

/// One selectable option in a choice group, in priority order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChoiceOption {
    /// Substring looked for in the lowercased, trimmed cell value.
    pub keyword: String,
    /// Control clicked when the keyword matches.
    pub control_id: String,
}

/// Declaration linking a logical field to its source column and, when the
/// engine fills it, to its destination control.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub logical_name: String,
    pub source_column: String,
    pub kind: ControlKind,
    /// Destination control. `None` means the column is validated but the
    /// engine does not write it (e.g. the team column used for selection).
    pub control_id: Option<String>,
    /// Options for [`ControlKind::Choice`] fields; empty otherwise.
    pub options: Vec<ChoiceOption>,
}

impl FieldMapping {
    fn column(name: &str, column: &str) -> Self {
        Self {
            logical_name: name.to_string(),
            source_column: column.to_string(),
            kind: ControlKind::Text,
            control_id: None,
            options: Vec::new(),
        }
    }

    fn text(name: &str, column: &str, control_id: &str) -> Self {
        Self {
            control_id: Some(control_id.to_string()),
            ..Self::column(name, column)
        }
    }

    fn number(name: &str, column: &str, control_id: &str) -> Self {
        Self {
            kind: ControlKind::Number,
            control_id: Some(control_id.to_string()),
            ..Self::column(name, column)
        }
    }

    fn choice(name: &str, column: &str, options: Vec<ChoiceOption>) -> Self {
        Self {
            kind: ControlKind::Choice,
            options,
            ..Self::column(name, column)
        }
    }

    fn comment(name: &str, column: &str, control_id: Option<&str>) -> Self {
        Self {
            kind: ControlKind::Comment,
            control_id: control_id.map(|s| s.to_string()),
            ..Self::column(name, column)
        }
    }
}

/// Per-field override loaded from the deployment TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldOverride {
    pub control_id: Option<String>,
    pub options: Option<Vec<ChoiceOption>>,
}

/// The complete mapping table for one form deployment.
#[derive(Debug, Clone)]
pub struct FieldMappingTable {
    entries: Vec<FieldMapping>,
}

impl FieldMappingTable {
    /// Build a table from explicit entries. Logical names must be unique.
    pub fn new(entries: Vec<FieldMapping>) -> Self {
        debug_assert!({
            let mut seen = HashSet::new();
            entries.iter().all(|e| seen.insert(e.logical_name.clone()))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[FieldMapping] {
        &self.entries
    }

    /// Built-in mapping for the I-Corps Course Evaluation form.
    ///
    /// Columns without a control id are validated for presence but filled
    /// manually or not at all on the current form revision.
    pub fn course_evaluation() -> Self {
        let outcome_options = vec![
            ChoiceOption { keyword: "dropped".into(), control_id: "Radio8_1".into() },
            ChoiceOption { keyword: "completed".into(), control_id: "Radio8_2".into() },
            ChoiceOption { keyword: "not continuing".into(), control_id: "Radio8_3".into() },
        ];
        Self::new(vec![
            FieldMapping::column("Team/Project Name", "Team/Project Name"),
            FieldMapping::text("Evaluator Name", "Evaluator Name", "SingleLine7-arialabel"),
            FieldMapping::column("Date", "Date of Evaluation"),
            FieldMapping::choice(
                "Program Outcome",
                "Program Outcome: Completed and team is continuing with project or Dropped out of the Program",
                outcome_options,
            ),
            FieldMapping::number("Customer Interviews", "Customer Interviews Completed", "Number-arialabel"),
            FieldMapping::column("Customer Discovery", "Customer Discovery Interviewing: Competence level: High or Fair or Not Yet"),
            FieldMapping::comment("Customer Discovery Comments", "Customer Discovery Interviewing Comments", Some("MultiLine5-arialabel")),
            FieldMapping::column("Program Engagement", "Program Engagement: Competence level: High or Fair or Not Yet"),
            FieldMapping::comment("Program Engagement Comments", "Program Engagement Comments", None),
            FieldMapping::column("Hypothesis Development", "Hypotheses Development : Competence level: High or Fair or Not Yet"),
            FieldMapping::comment("Hypothesis Comments", "Hypotheses Development Comments", None),
            FieldMapping::column("Customer Mapping", "Customer/Ecosystem Mapping: Competence level: High or Fair or Not Yet"),
            FieldMapping::comment("Customer Mapping Comments", "Customer/Ecosystem Mapping Comments", None),
            FieldMapping::column("Value Proposition", "Value Proposition Design:Competence level: High or Fair or Not Yet"),
            FieldMapping::comment("Value Proposition Comments", "Value Proposition Design Comments", None),
            FieldMapping::column("Integration", "Integration of Insights: Competence level: High or Fair or Not Yet"),
            FieldMapping::comment("Integration Comments", "Integration of Insights Comments", None),
            FieldMapping::column("Commercialization", "Commercialization Pathway: Competence level: High or Fair or Not Yet"),
            FieldMapping::comment("Commercialization Comments", "Commercialization Pathway Comments", None),
            FieldMapping::column("NSF Ready", "Ready for National NSF I-Corps? Yes or No"),
            FieldMapping::comment("NSF Comments", "National I-Corps Readiness Comments", None),
            FieldMapping::comment("Team Dynamics Comments", "Team Dynamics and Coachability Comments", None),
            FieldMapping::comment("Other Comments", "Other Comments", None),
        ])
    }

    /// Check that every required source column is present in the loaded
    /// table. Pure; returns the complete list of missing columns so all
    /// header mistakes surface in one report.
    pub fn validate(&self, table_columns: &HashSet<String>) -> Result<(), ColumnMismatchError> {
        let missing: Vec<String> = self
            .entries
            .iter()
            .filter(|e| !table_columns.contains(&e.source_column))
            .map(|e| e.source_column.clone())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ColumnMismatchError { missing })
        }
    }

    /// Apply deployment overrides by logical field name. Unknown names are
    /// ignored with a warning rather than rejected, so an override file can
    /// be shared across form revisions.
    pub fn apply_overrides(
        &mut self,
        overrides: impl IntoIterator<Item = (String, FieldOverride)>,
    ) {
        for (name, over) in overrides {
            match self.entries.iter_mut().find(|e| e.logical_name == name) {
                Some(entry) => {
                    if let Some(control_id) = over.control_id {
                        entry.control_id = Some(control_id);
                    }
                    if let Some(options) = over.options {
                        entry.options = options;
                    }
                }
                None => {
                    tracing::warn!("mapping override for unknown field '{}' ignored", name);
                }
            }
        }
    }
}
