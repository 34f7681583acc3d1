//! Error taxonomy for the form submission engine.
//!
//! Three failure scopes exist and must not be mixed up:
//! - run-fatal before a session exists (`ColumnMismatchError`, `SessionError`)
//! - batch-fatal after a session exists (`BatchError`)
//! - record-scoped (`FieldFillError`, `PageError`), recovered at the record
//!   boundary so the batch keeps going

use thiserror::Error;

/// A required source column is absent from the loaded table.
///
/// Carries every missing column, not just the first, so the operator can fix
/// the whole header row in one pass. Raised before any browser session is
/// opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column mismatch, missing or misnamed columns: {missing:?}")]
pub struct ColumnMismatchError {
    /// Missing source columns, in mapping order.
    pub missing: Vec<String>,
}

/// Browser session acquisition errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A single launch strategy failed.
    #[error("launch strategy '{strategy}' failed: {message}")]
    LaunchFailed { strategy: String, message: String },

    /// Every strategy in the probe chain failed.
    #[error("no browser launch strategy succeeded: [{}]", attempts.join("; "))]
    AllStrategiesFailed { attempts: Vec<String> },
}

/// Errors produced by a [`FormPage`](crate::infrastructure::FormPage)
/// implementation while talking to the rendered page.
#[derive(Debug, Error)]
pub enum PageError {
    /// Navigation to the form URL failed.
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// The control did not appear within the bounded wait.
    #[error("control '{control_id}' not found on the page")]
    ControlNotFound { control_id: String },

    /// Script execution against the page failed.
    #[error("script execution failed: {message}")]
    Script { message: String },
}

impl PageError {
    /// Whether this error means "the control is simply not there", as
    /// opposed to a broken page or session. Comment-field handling keys
    /// off this distinction.
    pub fn is_control_missing(&self) -> bool {
        matches!(self, PageError::ControlNotFound { .. })
    }
}

/// A required field could not be filled. Recovered at record granularity:
/// the record is reported as a partial failure and the batch continues.
#[derive(Debug, Error)]
pub enum FieldFillError {
    /// A numeric counter cell could not be coerced to a number.
    #[error("field '{field}': value '{value}' is not numeric")]
    NotNumeric { field: String, value: String },

    /// A required control was absent from the form.
    #[error("field '{field}': control '{control_id}' not found")]
    ControlNotFound { field: String, control_id: String },

    /// Any other page interaction failure on a required field.
    #[error("field '{field}': {source}")]
    Interaction {
        field: String,
        #[source]
        source: PageError,
    },
}

/// Batch-level fatal error. Produced only for session acquisition failure or
/// a navigation failure on the very first record; everything else is
/// recovered per record.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch aborted: {message}")]
    Aborted { message: String },

    #[error("browser session could not be acquired: {source}")]
    SessionAcquisition {
        #[from]
        source: SessionError,
    },
}
