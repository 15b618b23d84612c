//! Events emitted while a run progresses

use crate::core::{RunStatus, StepError};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        run_id: Uuid,
        pipeline_name: String,
        total_steps: usize,
    },
    StepStarted {
        run_id: Uuid,
        step_name: String,
        index: usize,
    },
    StepCompleted {
        run_id: Uuid,
        step_name: String,
        elapsed: Duration,
    },
    StepFailed {
        run_id: Uuid,
        error: StepError,
    },
    RunFinished {
        run_id: Uuid,
        pipeline_name: String,
        status: RunStatus,
    },
}

impl ExecutionEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            ExecutionEvent::RunStarted { run_id, .. }
            | ExecutionEvent::StepStarted { run_id, .. }
            | ExecutionEvent::StepCompleted { run_id, .. }
            | ExecutionEvent::StepFailed { run_id, .. }
            | ExecutionEvent::RunFinished { run_id, .. } => *run_id,
        }
    }
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;
