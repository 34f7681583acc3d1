//! Application lifecycle: load → validate → acquire → run → release.
//!
//! The only module that owns a [`SessionHandle`]. Validation runs before a
//! session is ever opened, and the session is released on every exit path,
//! including a batch-fatal abort.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::browser::{BrowserSettings, SessionHandle};
use crate::config::Config;
use crate::models::mapping::FieldMappingTable;
use crate::models::outcome::{RowOutcome, RowStatus};
use crate::models::table::Batch;
use crate::models::{load_data_table, load_mapping_overrides};
use crate::orchestrator::batch_runner::{BatchRunner, LogSink};

/// Source column used for the team subset selection.
const TEAM_COLUMN: &str = "Team/Project Name";

/// Application entry object, owner of the whole run's lifecycle.
pub struct App {
    config: Config,
    mapping: FieldMappingTable,
}

impl App {
    /// Build the mapping table (built-in form layout plus any deployment
    /// overrides). No browser work happens here.
    pub async fn initialize(config: Config) -> Result<Self> {
        let mut mapping = FieldMappingTable::course_evaluation();
        if let Some(path) = &config.mapping_overrides_file {
            let overrides = load_mapping_overrides(Path::new(path)).await?;
            info!("applying {} mapping override(s) from {}", overrides.len(), path);
            mapping.apply_overrides(overrides);
        }
        Ok(Self { config, mapping })
    }

    pub fn mapping(&self) -> &FieldMappingTable {
        &self.mapping
    }

    /// Run one batch end to end. Returns the per-record outcomes.
    pub async fn run(&self) -> Result<Vec<RowOutcome>> {
        log_startup(&self.config);

        let table = load_data_table(Path::new(&self.config.data_file)).await?;

        // Gate on column validation before any session exists; the full
        // missing list surfaces in one error.
        self.mapping.validate(&table.column_set())?;
        info!("✓ columns validated ({} present)", table.columns.len());

        let batch: Batch = match &self.config.team {
            Some(team) => {
                let rows = table.filter_rows(TEAM_COLUMN, team);
                info!("found {} record(s) for team '{}'", rows.len(), team);
                rows
            }
            None => table.rows.clone(),
        };

        if batch.is_empty() {
            warn!("⚠️ no records to process");
            return Ok(Vec::new());
        }

        let settings = BrowserSettings::from_config(&self.config);
        let mut session = SessionHandle::acquire(&settings).await?;

        let runner = BatchRunner::new(
            &self.mapping,
            &self.config.form_url,
            self.config.submit_enabled,
        );
        let mut sink = LogSink;
        let result = runner.run(session.page(), &batch, &mut sink).await;

        // Release on every exit path, normal completion or batch abort.
        session.close().await;

        let outcomes = result?;
        print_final_stats(&outcomes);
        Ok(outcomes)
    }
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 evaluation form submission run");
    info!("📄 input table: {}", config.data_file);
    info!("🎯 form target: {}", config.form_url);
    info!(
        "📝 submission: {}",
        if config.submit_enabled { "ENABLED" } else { "disabled (fill-only dry run)" }
    );
    info!("{}", "=".repeat(60));
}

fn print_final_stats(outcomes: &[RowOutcome]) {
    let success = outcomes
        .iter()
        .filter(|o| o.status == RowStatus::Success)
        .count();
    let failed = outcomes.len() - success;

    info!("{}", "=".repeat(60));
    info!("📊 run complete");
    info!(
        "finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ success: {}/{}", success, outcomes.len());
    info!("❌ failed: {}", failed);
    info!("{}", "=".repeat(60));
}
