//! Step domain model

use crate::actions::{ActionError, FnAction, StepAction, StepContext, Timeout};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A single named step in a pipeline
#[derive(Clone)]
pub struct Step {
    /// Step identifier, unique within its pipeline
    pub name: String,

    action: Arc<dyn StepAction>,
}

impl Step {
    pub fn new(name: impl Into<String>, action: impl StepAction + 'static) -> Self {
        Self::from_arc(name, Arc::new(action))
    }

    /// Create a step sharing an existing action
    pub fn from_arc(name: impl Into<String>, action: Arc<dyn StepAction>) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }

    /// Create a step from an async closure
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self::new(name, FnAction::new(f))
    }

    /// Put a deadline on this step's action
    pub fn with_timeout(self, limit: Duration) -> Self {
        Self {
            name: self.name,
            action: Arc::new(Timeout::new(self.action, limit)),
        }
    }

    pub fn describe(&self) -> String {
        self.action.describe()
    }

    /// Invoke the action once and wait for it to settle
    pub async fn invoke(&self, ctx: &StepContext) -> Result<(), ActionError> {
        self.action.run(ctx).await
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("action", &self.action.describe())
            .finish()
    }
}
