//! Sequential task runner - executes a pipeline's steps strictly in order

use crate::{
    actions::{ActionError, StepContext},
    core::{FailureCause, Pipeline, Run, RunStatus, StepError, StepOutcome, StepRecord},
    execution::events::{EventHandler, ExecutionEvent},
};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs pipelines one step at a time, stopping at the first failure
///
/// The runner holds only its event handlers, which are fixed at
/// construction. A single runner can drive any number of concurrent runs.
#[derive(Clone, Default)]
pub struct SequentialTaskRunner {
    event_handlers: Vec<EventHandler>,
}

impl SequentialTaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Run the pipeline to completion or first failure
    pub async fn run(&self, pipeline: &Pipeline) -> Result<(), StepError> {
        self.execute(pipeline, CancellationToken::new())
            .await
            .into_result()
    }

    /// Run the pipeline and return the terminal [`Run`]
    ///
    /// `cancel` is checked before each step starts. Once it fires no
    /// further step is started and the run fails with
    /// [`FailureCause::Cancelled`].
    pub async fn execute(&self, pipeline: &Pipeline, cancel: CancellationToken) -> Run {
        let mut run = Run::new(pipeline.name.clone(), pipeline.len());
        run.start();

        info!(
            "Starting pipeline {} ({}) with {} steps",
            pipeline.name,
            run.run_id,
            pipeline.len()
        );
        self.emit_event(ExecutionEvent::RunStarted {
            run_id: run.run_id,
            pipeline_name: pipeline.name.clone(),
            total_steps: pipeline.len(),
        });

        for (index, step) in pipeline.steps().iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Run {} cancelled before step {}", run.run_id, step.name);
                self.fail_run(&mut run, StepError::cancelled(step.name.clone()));
                break;
            }

            debug!("Run {} starting step {} ({})", run.run_id, step.name, index);
            self.emit_event(ExecutionEvent::StepStarted {
                run_id: run.run_id,
                step_name: step.name.clone(),
                index,
            });

            let ctx = StepContext::new(run.run_id, step.name.clone(), index, cancel.child_token());
            let started_at = Utc::now();
            let result = step.invoke(&ctx).await;
            let finished_at = Utc::now();

            match result {
                Ok(()) => {
                    let record = StepRecord {
                        name: step.name.clone(),
                        started_at,
                        finished_at,
                        outcome: StepOutcome::Succeeded,
                    };
                    let elapsed = record.elapsed();
                    run.record_step(record);
                    run.advance();

                    info!("Step {} completed in {:?}", step.name, elapsed);
                    self.emit_event(ExecutionEvent::StepCompleted {
                        run_id: run.run_id,
                        step_name: step.name.clone(),
                        elapsed,
                    });
                }
                Err(err) => {
                    let cause = match err {
                        ActionError::Interrupted if cancel.is_cancelled() => FailureCause::Cancelled,
                        other => FailureCause::Action(other),
                    };
                    let error = StepError::new(step.name.clone(), cause);

                    run.record_step(StepRecord {
                        name: step.name.clone(),
                        started_at,
                        finished_at,
                        outcome: StepOutcome::Failed {
                            error: error.cause.to_string(),
                        },
                    });
                    self.fail_run(&mut run, error);
                    break;
                }
            }
        }

        if run.status() == RunStatus::Running {
            run.complete();
        }

        info!(
            "Pipeline {} finished: {:?}",
            pipeline.name,
            run.status()
        );
        self.emit_event(ExecutionEvent::RunFinished {
            run_id: run.run_id,
            pipeline_name: pipeline.name.clone(),
            status: run.status(),
        });

        run
    }

    fn fail_run(&self, run: &mut Run, error: StepError) {
        warn!("Run {} failed: {}", run.run_id, error);
        self.emit_event(ExecutionEvent::StepFailed {
            run_id: run.run_id,
            error: error.clone(),
        });
        run.fail(error);
    }
}

impl std::fmt::Debug for SequentialTaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialTaskRunner")
            .field("event_handlers", &self.event_handlers.len())
            .finish()
    }
}
