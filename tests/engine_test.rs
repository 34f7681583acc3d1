//! Engine tests: batch runner + field filler against a scripted page.
//!
//! No browser involved; the mock implements the `FormPage` capability trait
//! and records every interaction.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use eval_form_submit::models::mapping::{ChoiceOption, ControlKind, FieldMapping};
use eval_form_submit::{
    BatchError, BatchRunner, CellValue, DataTable, FieldMappingTable, FormPage, PageError,
    ProgressSink, Record, RowOutcome, RowStatus,
};

const FORM_URL: &str = "https://example.org/form";

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Navigate(String),
    SetField(String, String),
    Click(String),
    Submit,
}

#[derive(Default)]
struct MockState {
    actions: Vec<Action>,
    nav_calls: usize,
}

/// Scripted form page. Controls listed in `missing_controls` behave as if
/// absent from the form; navigation calls listed in `fail_nav_calls`
/// (zero-based) fail.
#[derive(Default)]
struct MockFormPage {
    missing_controls: HashSet<String>,
    fail_nav_calls: HashSet<usize>,
    state: Mutex<MockState>,
}

impl MockFormPage {
    fn with_missing_controls(ids: &[&str]) -> Self {
        Self {
            missing_controls: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn with_failing_navigations(calls: &[usize]) -> Self {
        Self {
            fail_nav_calls: calls.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn actions(&self) -> Vec<Action> {
        self.state.lock().unwrap().actions.clone()
    }

    fn navigation_count(&self) -> usize {
        self.state.lock().unwrap().nav_calls
    }
}

#[async_trait]
impl FormPage for MockFormPage {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        let call = state.nav_calls;
        state.nav_calls += 1;
        if self.fail_nav_calls.contains(&call) {
            return Err(PageError::Navigation {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }
        state.actions.push(Action::Navigate(url.to_string()));
        Ok(())
    }

    async fn set_field(&self, control_id: &str, value: &str) -> Result<(), PageError> {
        if self.missing_controls.contains(control_id) {
            return Err(PageError::ControlNotFound {
                control_id: control_id.to_string(),
            });
        }
        self.state
            .lock()
            .unwrap()
            .actions
            .push(Action::SetField(control_id.to_string(), value.to_string()));
        Ok(())
    }

    async fn click_control(&self, control_id: &str) -> Result<(), PageError> {
        if self.missing_controls.contains(control_id) {
            return Err(PageError::ControlNotFound {
                control_id: control_id.to_string(),
            });
        }
        self.state
            .lock()
            .unwrap()
            .actions
            .push(Action::Click(control_id.to_string()));
        Ok(())
    }

    async fn submit(&self) -> Result<(), PageError> {
        self.state.lock().unwrap().actions.push(Action::Submit);
        Ok(())
    }
}

/// Sink that records everything it is handed.
#[derive(Default)]
struct CollectSink {
    reports: Vec<(RowOutcome, usize, usize)>,
}

impl ProgressSink for CollectSink {
    fn on_outcome(&mut self, outcome: &RowOutcome, completed: usize, total: usize) {
        self.reports.push((outcome.clone(), completed, total));
    }
}

fn mapping() -> FieldMappingTable {
    FieldMappingTable::new(vec![
        FieldMapping {
            logical_name: "Evaluator Name".into(),
            source_column: "Evaluator Name".into(),
            kind: ControlKind::Text,
            control_id: Some("SingleLine7-arialabel".into()),
            options: vec![],
        },
        FieldMapping {
            logical_name: "Program Outcome".into(),
            source_column: "Program Outcome".into(),
            kind: ControlKind::Choice,
            control_id: None,
            options: vec![
                ChoiceOption { keyword: "dropped".into(), control_id: "Radio8_1".into() },
                ChoiceOption { keyword: "completed".into(), control_id: "Radio8_2".into() },
            ],
        },
        FieldMapping {
            logical_name: "Customer Interviews".into(),
            source_column: "Customer Interviews Completed".into(),
            kind: ControlKind::Number,
            control_id: Some("Number-arialabel".into()),
            options: vec![],
        },
        FieldMapping {
            logical_name: "Customer Discovery Comments".into(),
            source_column: "Customer Discovery Interviewing Comments".into(),
            kind: ControlKind::Comment,
            control_id: Some("MultiLine5-arialabel".into()),
            options: vec![],
        },
    ])
}

fn record(name: &str, interviews: CellValue) -> Record {
    let mut row = Record::new();
    row.insert("Evaluator Name", CellValue::Text(name.to_string()));
    row.insert("Program Outcome", CellValue::Text("Completed".to_string()));
    row.insert("Customer Interviews Completed", interviews);
    row.insert(
        "Customer Discovery Interviewing Comments",
        CellValue::Text("good progress".to_string()),
    );
    row
}

async fn run(
    page: &MockFormPage,
    batch: &[Record],
    submit_enabled: bool,
) -> (Result<Vec<RowOutcome>, BatchError>, CollectSink) {
    let table = mapping();
    let runner = BatchRunner::new(&table, FORM_URL, submit_enabled);
    let mut sink = CollectSink::default();
    let result = runner.run(page, batch, &mut sink).await;
    (result, sink)
}

#[tokio::test]
async fn emits_one_outcome_per_record_in_ascending_order() {
    let page = MockFormPage::default();
    let batch = vec![
        record("Alice", CellValue::Number(3.0)),
        record("Bob", CellValue::Text("N/A".into())),
        record("Carol", CellValue::Number(7.0)),
    ];

    let (result, _) = run(&page, &batch, false).await;
    let outcomes = result.unwrap();

    assert_eq!(outcomes.len(), 3);
    let indices: Vec<usize> = outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test]
async fn non_numeric_counter_is_partial_failure_and_batch_continues() {
    let page = MockFormPage::default();
    let batch = vec![
        record("Alice", CellValue::Number(3.0)),
        record("Bob", CellValue::Text("N/A".into())),
        record("Carol", CellValue::Number(7.0)),
    ];

    let (result, _) = run(&page, &batch, false).await;
    let outcomes = result.unwrap();

    assert_eq!(outcomes[1].status, RowStatus::PartialFailure);
    assert!(outcomes[1].message.contains("not numeric"));
    assert_eq!(outcomes[0].status, RowStatus::Success);
    assert_eq!(outcomes[2].status, RowStatus::Success);
    // Every record got its own fresh navigation.
    assert_eq!(page.navigation_count(), 3);
}

// End-to-end scenario: 3 rows, one interview count is the string "five".
#[tokio::test]
async fn string_interview_count_fails_only_its_own_row() {
    let page = MockFormPage::default();
    let batch = vec![
        record("Alice", CellValue::Number(12.0)),
        record("Bob", CellValue::Text("five".into())),
        record("Carol", CellValue::Number(4.0)),
    ];

    let (result, _) = run(&page, &batch, false).await;
    let outcomes = result.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].status, RowStatus::Success);
    assert_eq!(outcomes[1].status, RowStatus::PartialFailure);
    assert!(outcomes[1].message.contains("not numeric"));
    assert_eq!(outcomes[2].status, RowStatus::Success);
}

#[tokio::test]
async fn absent_comment_control_is_success_with_warning() {
    let page = MockFormPage::with_missing_controls(&["MultiLine5-arialabel"]);
    let batch = vec![record("Alice", CellValue::Number(3.0))];

    let (result, _) = run(&page, &batch, false).await;
    let outcomes = result.unwrap();

    assert_eq!(outcomes[0].status, RowStatus::Success);
    assert!(outcomes[0].message.contains("not present on this form version"));
}

#[tokio::test]
async fn absent_required_control_is_partial_failure() {
    let page = MockFormPage::with_missing_controls(&["SingleLine7-arialabel"]);
    let batch = vec![record("Alice", CellValue::Number(3.0))];

    let (result, _) = run(&page, &batch, false).await;
    let outcomes = result.unwrap();

    assert_eq!(outcomes[0].status, RowStatus::PartialFailure);
    assert!(outcomes[0].message.contains("SingleLine7-arialabel"));
}

#[tokio::test]
async fn disabled_submission_never_reaches_submit() {
    let page = MockFormPage::default();
    let batch = vec![
        record("Alice", CellValue::Number(3.0)),
        record("Bob", CellValue::Number(5.0)),
    ];

    let (result, _) = run(&page, &batch, false).await;
    let outcomes = result.unwrap();

    assert!(outcomes.iter().all(|o| o.status == RowStatus::Success));
    assert!(!page.actions().contains(&Action::Submit));
}

// End-to-end scenario: submission enabled, 2 valid rows.
#[tokio::test]
async fn enabled_submission_submits_every_record_in_order() {
    let page = MockFormPage::default();
    let batch = vec![
        record("Alice", CellValue::Number(3.0)),
        record("Bob", CellValue::Number(5.0)),
    ];

    let (result, _) = run(&page, &batch, true).await;
    let outcomes = result.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == RowStatus::Success));
    assert!(outcomes.iter().all(|o| o.message.contains("submitted")));
    let submits = page
        .actions()
        .iter()
        .filter(|a| **a == Action::Submit)
        .count();
    assert_eq!(submits, 2);
}

#[tokio::test]
async fn choice_group_clicks_matching_option_and_skips_on_no_match() {
    let page = MockFormPage::default();
    let mut no_match = record("Bob", CellValue::Number(1.0));
    no_match.insert("Program Outcome", CellValue::Text("unclear".into()));
    let mut dropped = record("Alice", CellValue::Number(2.0));
    dropped.insert(
        "Program Outcome",
        CellValue::Text("Dropped out of the Program".into()),
    );

    let (result, _) = run(&page, &[dropped, no_match], false).await;
    let outcomes = result.unwrap();

    assert!(outcomes.iter().all(|o| o.status == RowStatus::Success));
    let clicks: Vec<Action> = page
        .actions()
        .into_iter()
        .filter(|a| matches!(a, Action::Click(_)))
        .collect();
    assert_eq!(clicks, vec![Action::Click("Radio8_1".to_string())]);
}

#[tokio::test]
async fn first_record_navigation_failure_aborts_the_batch() {
    let page = MockFormPage::with_failing_navigations(&[0]);
    let batch = vec![
        record("Alice", CellValue::Number(3.0)),
        record("Bob", CellValue::Number(5.0)),
    ];

    let (result, sink) = run(&page, &batch, false).await;

    assert!(matches!(result, Err(BatchError::Aborted { .. })));
    // Exactly one fatal outcome on the stream, nothing filled afterwards.
    assert_eq!(sink.reports.len(), 1);
    assert_eq!(sink.reports[0].0.status, RowStatus::FatalAbort);
    assert!(page.actions().is_empty());
}

#[tokio::test]
async fn later_navigation_failure_is_record_scoped() {
    let page = MockFormPage::with_failing_navigations(&[1]);
    let batch = vec![
        record("Alice", CellValue::Number(3.0)),
        record("Bob", CellValue::Number(5.0)),
        record("Carol", CellValue::Number(7.0)),
    ];

    let (result, _) = run(&page, &batch, false).await;
    let outcomes = result.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].status, RowStatus::Success);
    assert_eq!(outcomes[1].status, RowStatus::PartialFailure);
    assert!(outcomes[1].message.contains("navigation failed"));
    assert_eq!(outcomes[2].status, RowStatus::Success);
}

#[tokio::test]
async fn progress_fraction_advances_after_every_record() {
    let page = MockFormPage::default();
    let batch = vec![
        record("Alice", CellValue::Number(1.0)),
        record("Bob", CellValue::Text("five".into())),
        record("Carol", CellValue::Number(3.0)),
    ];

    let (result, sink) = run(&page, &batch, false).await;
    result.unwrap();

    let fractions: Vec<(usize, usize)> = sink
        .reports
        .iter()
        .map(|(_, completed, total)| (*completed, *total))
        .collect();
    assert_eq!(fractions, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn empty_batch_produces_no_outcomes() {
    let page = MockFormPage::default();
    let (result, sink) = run(&page, &[], false).await;

    assert!(result.unwrap().is_empty());
    assert!(sink.reports.is_empty());
    assert_eq!(page.navigation_count(), 0);
}

// End-to-end scenario: the run refuses to start on a missing column.
#[test]
fn missing_column_refuses_the_run_before_any_session() {
    let table = DataTable {
        columns: vec![
            "Program Outcome".into(),
            "Customer Interviews Completed".into(),
            "Customer Discovery Interviewing Comments".into(),
        ],
        rows: vec![],
    };

    let err = mapping().validate(&table.column_set()).unwrap_err();
    assert_eq!(err.missing, vec!["Evaluator Name".to_string()]);
}
