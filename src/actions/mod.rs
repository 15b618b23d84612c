//! Step actions - the asynchronous work a step performs

pub mod command;
pub mod error;
pub mod function;
pub mod log;
pub mod sleep;
pub mod timeout;

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub use command::{CommandAction, OutputPattern};
pub use error::ActionError;
pub use function::FnAction;
pub use log::LogAction;
pub use sleep::SleepAction;
pub use timeout::Timeout;

/// Context handed to an action when its step starts
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Run this step belongs to
    pub run_id: Uuid,

    /// Name of the step being executed
    pub step_name: String,

    /// Position of the step in its pipeline
    pub step_index: usize,

    cancel: CancellationToken,
}

impl StepContext {
    pub fn new(
        run_id: Uuid,
        step_name: impl Into<String>,
        step_index: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            run_id,
            step_name: step_name.into(),
            step_index,
            cancel,
        }
    }

    /// Context for running an action outside of a pipeline
    pub fn detached(step_name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), step_name, 0, CancellationToken::new())
    }

    /// Cancellation signal of the owning run
    ///
    /// Actions may observe it to end long waits early. The runner never
    /// aborts an action on its own.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Trait for step actions - allows for different implementations
#[async_trait]
pub trait StepAction: Send + Sync {
    /// Perform the work, resolving once it has finished
    async fn run(&self, ctx: &StepContext) -> Result<(), ActionError>;

    /// Short human-readable description for diagnostics
    fn describe(&self) -> String {
        "custom action".to_string()
    }
}

#[async_trait]
impl<A: StepAction + ?Sized> StepAction for Arc<A> {
    async fn run(&self, ctx: &StepContext) -> Result<(), ActionError> {
        (**self).run(ctx).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
