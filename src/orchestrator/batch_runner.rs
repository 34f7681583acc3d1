//! Batch runner: drives the per-record navigate → fill → submit → report
//! loop over one browser session.
//!
//! Records are processed strictly in input order, one at a time. A failure
//! inside one record is reported and the loop moves on; only session
//! acquisition and the very first navigation are batch-fatal.

use tracing::{error, info};

use crate::error::BatchError;
use crate::infrastructure::FormPage;
use crate::models::mapping::FieldMappingTable;
use crate::models::outcome::{RowOutcome, RowStatus};
use crate::models::table::Record;
use crate::services::FieldFiller;

/// Consumer of the per-record outcome stream.
pub trait ProgressSink {
    /// Called once per attempted record, immediately after it is reported.
    /// `completed / total` is the running completion fraction.
    fn on_outcome(&mut self, outcome: &RowOutcome, completed: usize, total: usize);
}

/// Default sink: reports progress through tracing.
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_outcome(&mut self, outcome: &RowOutcome, completed: usize, total: usize) {
        let percent = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        match outcome.status {
            RowStatus::Success => info!(
                "✓ record {}/{}: {} [{:.0}%]",
                outcome.index + 1,
                total,
                outcome.message,
                percent
            ),
            RowStatus::PartialFailure => error!(
                "❌ record {}/{}: {} [{:.0}%]",
                outcome.index + 1,
                total,
                outcome.message,
                percent
            ),
            RowStatus::FatalAbort => error!(
                "❌ batch aborted at record {}/{}: {}",
                outcome.index + 1,
                total,
                outcome.message
            ),
        }
    }
}

/// One configured batch run: URL, mapping, and submission policy are
/// parameters, never globals.
pub struct BatchRunner<'a> {
    mapping: &'a FieldMappingTable,
    form_url: &'a str,
    submit_enabled: bool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(mapping: &'a FieldMappingTable, form_url: &'a str, submit_enabled: bool) -> Self {
        Self {
            mapping,
            form_url,
            submit_enabled,
        }
    }

    /// Process every record in `batch` against the given page.
    ///
    /// Returns one outcome per record in input order, or a [`BatchError`]
    /// when the run aborted (in which case exactly one `FatalAbort` outcome
    /// has been emitted through the sink for the record in flight).
    pub async fn run<P: FormPage + ?Sized>(
        &self,
        page: &P,
        batch: &[Record],
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<RowOutcome>, BatchError> {
        let total = batch.len();
        let filler = FieldFiller::new(self.mapping);
        let mut outcomes = Vec::with_capacity(total);

        for (index, record) in batch.iter().enumerate() {
            info!("processing record {}/{}", index + 1, total);

            // The form is stateful per page load, so every record gets a
            // fresh navigation, including the first.
            if let Err(e) = page.navigate(self.form_url).await {
                if index == 0 {
                    // Nothing has worked yet; assume the session or the
                    // target is broken and stop before burning the batch.
                    let message = format!("initial navigation failed: {}", e);
                    let outcome = RowOutcome::fatal_abort(index, message.clone());
                    sink.on_outcome(&outcome, index, total);
                    return Err(BatchError::Aborted { message });
                }
                let outcome =
                    RowOutcome::partial_failure(index, format!("navigation failed: {}", e));
                sink.on_outcome(&outcome, index + 1, total);
                outcomes.push(outcome);
                continue;
            }

            let outcome = match filler.fill(page, record).await {
                Ok(warnings) => {
                    if self.submit_enabled {
                        match page.submit().await {
                            Ok(()) => RowOutcome::success(index, with_warnings("submitted", &warnings)),
                            Err(e) => RowOutcome::partial_failure(
                                index,
                                format!("submit failed: {}", e),
                            ),
                        }
                    } else {
                        RowOutcome::success(
                            index,
                            with_warnings("filled, submission disabled", &warnings),
                        )
                    }
                }
                Err(e) => RowOutcome::partial_failure(index, e.to_string()),
            };

            sink.on_outcome(&outcome, index + 1, total);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

fn with_warnings(base: &str, warnings: &[String]) -> String {
    if warnings.is_empty() {
        base.to_string()
    } else {
        format!("{}; warnings: {}", base, warnings.join("; "))
    }
}
