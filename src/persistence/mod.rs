//! Persistence layer for run history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

pub use crate::core::RunStatus;
use crate::core::Run;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Pipeline name
    pub pipeline_name: String,

    /// Terminal status
    pub status: RunStatus,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run reached its terminal state
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of steps that succeeded
    pub completed_steps: usize,

    /// Total number of steps
    pub total_steps: usize,

    /// Step the run stopped at, if it failed
    pub failed_step: Option<String>,

    /// Failure cause, if it failed
    pub error: Option<String>,
}

impl RunSummary {
    /// Progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return if self.status == RunStatus::Completed { 1.0 } else { 0.0 };
        }
        self.completed_steps as f64 / self.total_steps as f64
    }
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save a run
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// List runs of a pipeline, newest first
    async fn list_runs(&self, pipeline_name: &str) -> Result<Vec<RunSummary>>;

    /// List all pipeline names
    async fn list_pipelines(&self) -> Result<Vec<String>>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    runs: RwLock<HashMap<Uuid, RunSummary>>,
    by_pipeline: RwLock<HashMap<String, Vec<Uuid>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
            by_pipeline: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        let mut runs = self.runs.write().await;
        let is_new = runs.insert(run.run_id, run.clone()).is_none();

        if is_new {
            let mut by_pipeline = self.by_pipeline.write().await;
            by_pipeline
                .entry(run.pipeline_name.clone())
                .or_default()
                .push(run.run_id);
        }

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&run_id).cloned())
    }

    async fn list_runs(&self, pipeline_name: &str) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let by_pipeline = self.by_pipeline.read().await;

        let mut result: Vec<RunSummary> = by_pipeline
            .get(pipeline_name)
            .map(|ids| ids.iter().filter_map(|id| runs.get(id).cloned()).collect())
            .unwrap_or_default();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(result)
    }

    async fn list_pipelines(&self) -> Result<Vec<String>> {
        let by_pipeline = self.by_pipeline.read().await;
        let mut names: Vec<String> = by_pipeline.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Save every summary, carrying on past failures
///
/// Returns an error naming how many saves failed once all were attempted.
pub async fn save_summaries(
    store: &dyn PersistenceBackend,
    summaries: &[RunSummary],
) -> Result<()> {
    let mut failed = 0;
    for summary in summaries {
        if let Err(e) = store.save_run(summary).await {
            failed += 1;
            warn!("Failed to save run {}: {:#}", summary.run_id, e);
        }
    }

    if failed > 0 {
        anyhow::bail!("Failed to save {} of {} runs", failed, summaries.len());
    }
    Ok(())
}

/// Create a summary from a run
pub fn create_summary(run: &Run) -> RunSummary {
    RunSummary {
        run_id: run.run_id,
        pipeline_name: run.pipeline_name.clone(),
        status: run.status(),
        started_at: run.started_at().unwrap_or_else(Utc::now),
        finished_at: run.finished_at(),
        completed_steps: run.completed_steps(),
        total_steps: run.total_steps(),
        failed_step: run.error().map(|e| e.step_name.clone()),
        error: run.error().map(|e| e.cause.to_string()),
    }
}
