//! Orchestration layer.
//!
//! `app` owns resources and the run lifecycle; `batch_runner` owns the
//! per-record loop. Layering is strictly downward:
//!
//! ```text
//! app (validate → acquire → run → release)
//!     ↓
//! batch_runner (navigate → fill → submit → report, per record)
//!     ↓
//! services::FieldFiller (one record, one form instance)
//!     ↓
//! infrastructure::FormPage (page capabilities)
//! ```

pub mod app;
pub mod batch_runner;

pub use app::App;
pub use batch_runner::{BatchRunner, LogSink, ProgressSink};
