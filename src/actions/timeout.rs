//! Deadline wrapper for actions

use crate::actions::{ActionError, StepAction, StepContext};
use async_trait::async_trait;
use std::time::Duration;
use tracing::error;

/// Wraps an action with a deadline
///
/// Expiry is reported as [`ActionError::Timeout`], which the runner treats
/// like any other step failure.
#[derive(Debug, Clone)]
pub struct Timeout<A> {
    inner: A,
    limit: Duration,
}

impl<A: StepAction> Timeout<A> {
    pub fn new(inner: A, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[async_trait]
impl<A: StepAction> StepAction for Timeout<A> {
    async fn run(&self, ctx: &StepContext) -> Result<(), ActionError> {
        match tokio::time::timeout(self.limit, self.inner.run(ctx)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Timeout for step {} after {:?}", ctx.step_name, self.limit);
                Err(ActionError::Timeout(self.limit))
            }
        }
    }

    fn describe(&self) -> String {
        format!("{} (timeout {:?})", self.inner.describe(), self.limit)
    }
}
