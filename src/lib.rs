//! # Evaluation Form Submit
//!
//! Replays rows of structured evaluation data as browser-driven submissions
//! against a remote web form that has no API ingestion path.
//!
//! ## Architecture
//!
//! Four layers, dependencies pointing strictly downward:
//!
//! ### ① Infrastructure
//! - `infrastructure/` — owns the scarce resource (the live page), exposes
//!   capabilities only
//! - [`CdpPage`] — the sole owner of the chromiumoxide `Page`, implements
//!   the [`FormPage`] trait
//!
//! ### ② Services
//! - `services/` — single-record abilities
//! - [`FieldFiller`] — populates one form instance from one record
//!
//! ### ③ Models
//! - `models/` — mapping table, tabular input, outcomes, TOML loaders
//!
//! ### ④ Orchestration
//! - `orchestrator/` — [`App`] owns the run lifecycle and the browser
//!   session; [`BatchRunner`] drives the sequential per-record loop
//!
//! The engine is single-threaded by design: the destination form is
//! stateful per page load, so records are processed strictly in input
//! order over one session.

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;

pub use browser::{BrowserSettings, LaunchStrategy, SessionHandle};
pub use config::Config;
pub use error::{BatchError, ColumnMismatchError, FieldFillError, PageError, SessionError};
pub use infrastructure::{CdpPage, FormPage};
pub use models::{
    Batch, CellValue, DataTable, FieldMapping, FieldMappingTable, Record, RowOutcome, RowStatus,
};
pub use orchestrator::{App, BatchRunner, LogSink, ProgressSink};
pub use services::FieldFiller;
