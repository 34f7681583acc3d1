//! Per-record outcomes emitted on the progress stream.

use std::fmt;

/// Final status of one record's pass through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// Filled (and submitted, when enabled) without required-field failures.
    Success,
    /// A required field failed; the rest of the record was skipped and the
    /// batch moved on.
    PartialFailure,
    /// A batch-fatal condition was hit while this record was in flight.
    FatalAbort,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Success => write!(f, "success"),
            RowStatus::PartialFailure => write!(f, "partial failure"),
            RowStatus::FatalAbort => write!(f, "fatal abort"),
        }
    }
}

/// Produced exactly once per attempted record, in input order.
#[derive(Debug, Clone)]
pub struct RowOutcome {
    /// Zero-based position in the batch.
    pub index: usize,
    pub status: RowStatus,
    pub message: String,
}

impl RowOutcome {
    pub fn success(index: usize, message: impl Into<String>) -> Self {
        Self { index, status: RowStatus::Success, message: message.into() }
    }

    pub fn partial_failure(index: usize, message: impl Into<String>) -> Self {
        Self { index, status: RowStatus::PartialFailure, message: message.into() }
    }

    pub fn fatal_abort(index: usize, message: impl Into<String>) -> Self {
        Self { index, status: RowStatus::FatalAbort, message: message.into() }
    }
}
