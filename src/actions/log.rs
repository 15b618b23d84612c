//! Log action - emits a message and resolves immediately

use crate::actions::{ActionError, StepAction, StepContext};
use async_trait::async_trait;
use tracing::info;

/// Emits a message through the logging subscriber
#[derive(Debug, Clone)]
pub struct LogAction {
    message: String,
}

impl LogAction {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[async_trait]
impl StepAction for LogAction {
    async fn run(&self, ctx: &StepContext) -> Result<(), ActionError> {
        info!(step = %ctx.step_name, "{}", self.message);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("log {:?}", self.message)
    }
}
