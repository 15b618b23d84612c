//! Sleep action - a cancellable fixed delay

use crate::actions::{ActionError, StepAction, StepContext};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Waits for a fixed duration
///
/// Ends early with [`ActionError::Interrupted`] when the owning run is
/// cancelled.
#[derive(Debug, Clone, Copy)]
pub struct SleepAction {
    duration: Duration,
}

impl SleepAction {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[async_trait]
impl StepAction for SleepAction {
    async fn run(&self, ctx: &StepContext) -> Result<(), ActionError> {
        debug!("Step {} sleeping for {:?}", ctx.step_name, self.duration);

        tokio::select! {
            biased;

            _ = ctx.cancellation().cancelled() => {
                debug!("Step {} sleep interrupted", ctx.step_name);
                Err(ActionError::Interrupted)
            }
            _ = tokio::time::sleep(self.duration) => Ok(()),
        }
    }

    fn describe(&self) -> String {
        format!("sleep {:?}", self.duration)
    }
}
