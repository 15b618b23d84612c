//! Run state models

use crate::core::error::StepError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Run is executing steps
    Running,
    /// Every step succeeded
    Completed,
    /// A step failed or the run was cancelled
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "Pending",
            RunStatus::Running => "Running",
            RunStatus::Completed => "Completed",
            RunStatus::Failed => "Failed",
        }
    }

    /// Parse the form produced by [`RunStatus::as_str`]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(RunStatus::Pending),
            "Running" => Some(RunStatus::Running),
            "Completed" => Some(RunStatus::Completed),
            "Failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }
}

/// How a single step invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Succeeded,
    Failed { error: String },
}

/// Record of one step invocation within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// One execution of a pipeline
///
/// Created fresh per invocation. Once the status is terminal every
/// transition is a no-op, so a finished run can be inspected freely.
#[derive(Debug, Clone)]
pub struct Run {
    /// Unique run ID
    pub run_id: Uuid,

    /// Name of the pipeline being run
    pub pipeline_name: String,

    status: RunStatus,
    current_step_index: usize,
    total_steps: usize,
    error: Option<StepError>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    records: Vec<StepRecord>,
}

impl Run {
    pub fn new(pipeline_name: impl Into<String>, total_steps: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline_name: pipeline_name.into(),
            status: RunStatus::Pending,
            current_step_index: 0,
            total_steps,
            error: None,
            started_at: None,
            finished_at: None,
            records: Vec::new(),
        }
    }

    /// Pending -> Running
    pub(crate) fn start(&mut self) {
        if self.status != RunStatus::Pending {
            return;
        }
        self.status = RunStatus::Running;
        self.current_step_index = 0;
        self.started_at = Some(Utc::now());
    }

    pub(crate) fn record_step(&mut self, record: StepRecord) {
        if self.status != RunStatus::Running {
            return;
        }
        self.records.push(record);
    }

    /// Move past the current step after it succeeded
    pub(crate) fn advance(&mut self) {
        if self.status != RunStatus::Running {
            return;
        }
        self.current_step_index += 1;
    }

    /// Running -> Completed
    pub(crate) fn complete(&mut self) {
        if self.status != RunStatus::Running {
            return;
        }
        self.status = RunStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Running -> Failed
    pub(crate) fn fail(&mut self, error: StepError) {
        if self.status != RunStatus::Running {
            return;
        }
        self.status = RunStatus::Failed;
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Index of the step in flight, or of the failed step once failed
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn error(&self) -> Option<&StepError> {
        self.error.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Step invocations in the order they happened
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn completed_steps(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == StepOutcome::Succeeded)
            .count()
    }

    /// Calculate progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return if self.status == RunStatus::Completed { 1.0 } else { 0.0 };
        }
        self.completed_steps() as f64 / self.total_steps as f64
    }

    pub fn duration(&self) -> Option<Duration> {
        let started = self.started_at?;
        let finished = self.finished_at?;
        finished.signed_duration_since(started).to_std().ok()
    }

    /// Index to resume from after a failure
    pub fn resume_point(&self) -> Option<usize> {
        (self.status == RunStatus::Failed).then_some(self.current_step_index)
    }

    /// `Err` with the recorded step error if the run failed
    pub fn result(&self) -> Result<(), StepError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub fn into_result(self) -> Result<(), StepError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
