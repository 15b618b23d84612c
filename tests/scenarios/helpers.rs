//! Shared helpers for scenario tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskchain::actions::{ActionError, StepAction, StepContext};
use taskchain::core::{Pipeline, Run, RunStatus, Step, StepOutcome};
use taskchain::execution::SequentialTaskRunner;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One entry in a [`Journal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Start(String),
    End(String),
}

/// Shared log of step invocations across runs
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<(Uuid, Mark)>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&self, run_id: Uuid, step: &str) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .push((run_id, Mark::Start(step.to_string())));
    }

    fn leave(&self, run_id: Uuid, step: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((run_id, Mark::End(step.to_string())));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Every mark in the order it was written
    pub fn all(&self) -> Vec<(Uuid, Mark)> {
        self.entries.lock().unwrap().clone()
    }

    /// Marks written by one run
    pub fn for_run(&self, run_id: Uuid) -> Vec<Mark> {
        self.all()
            .into_iter()
            .filter(|(id, _)| *id == run_id)
            .map(|(_, mark)| mark)
            .collect()
    }

    /// Names of the steps that were started, in order
    pub fn started(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|(_, mark)| match mark {
                Mark::Start(name) => Some(name),
                Mark::End(_) => None,
            })
            .collect()
    }

    /// Highest number of steps that were running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Action that journals its start and end, optionally sleeping in between
pub struct Recorded {
    journal: Journal,
    delay: Option<Duration>,
    fail_with: Option<String>,
}

#[async_trait]
impl StepAction for Recorded {
    async fn run(&self, ctx: &StepContext) -> Result<(), ActionError> {
        self.journal.enter(ctx.run_id, &ctx.step_name);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.journal.leave(ctx.run_id, &ctx.step_name);

        match &self.fail_with {
            Some(message) => Err(ActionError::failed(message.clone())),
            None => Ok(()),
        }
    }
}

pub fn recorded_step(name: &str, journal: &Journal) -> Step {
    Step::new(
        name,
        Recorded {
            journal: journal.clone(),
            delay: None,
            fail_with: None,
        },
    )
}

pub fn slow_step(name: &str, journal: &Journal, delay: Duration) -> Step {
    Step::new(
        name,
        Recorded {
            journal: journal.clone(),
            delay: Some(delay),
            fail_with: None,
        },
    )
}

pub fn failing_step(name: &str, journal: &Journal, message: &str) -> Step {
    Step::new(
        name,
        Recorded {
            journal: journal.clone(),
            delay: None,
            fail_with: Some(message.to_string()),
        },
    )
}

/// Pipeline of `n` recorded steps named `step1..stepN`
pub fn numbered_pipeline(n: usize, journal: &Journal) -> Pipeline {
    (1..=n).fold(Pipeline::new("numbered"), |pipeline, i| {
        pipeline.with_step(recorded_step(&format!("step{}", i), journal))
    })
}

pub async fn execute(pipeline: &Pipeline) -> Run {
    SequentialTaskRunner::new()
        .execute(pipeline, CancellationToken::new())
        .await
}

/// Assert every start in `marks` is immediately followed by its own end
pub fn assert_no_overlap(marks: &[Mark]) {
    assert_eq!(marks.len() % 2, 0, "Unbalanced marks: {:?}", marks);
    for pair in marks.chunks(2) {
        match pair {
            [Mark::Start(a), Mark::End(b)] if a == b => {}
            other => panic!("Steps overlapped: {:?} in {:?}", other, marks),
        }
    }
}

pub fn assert_run_completed(run: &Run) {
    assert_eq!(
        run.status(),
        RunStatus::Completed,
        "Run should be completed, but failed with: {:?}",
        run.error()
    );
    assert!(run.error().is_none());
}

pub fn assert_run_failed_at(run: &Run, step_name: &str) {
    assert_eq!(run.status(), RunStatus::Failed, "Run should have failed");
    let error = run
        .error()
        .unwrap_or_else(|| panic!("Failed run has no error recorded"));
    assert_eq!(
        error.step_name, step_name,
        "Run failed at '{}', expected '{}'",
        error.step_name, step_name
    );
}

/// Names of steps that succeeded, in order
pub fn succeeded_steps(run: &Run) -> Vec<String> {
    run.records()
        .iter()
        .filter(|r| r.outcome == StepOutcome::Succeeded)
        .map(|r| r.name.clone())
        .collect()
}
