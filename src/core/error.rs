//! Run failure types

use crate::actions::ActionError;
use thiserror::Error;

/// Why a run stopped at a step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// The step's action returned a failure
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Cancellation was observed before the step could start or finish
    #[error("run was cancelled")]
    Cancelled,
}

/// The terminal error of a failed run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step '{step_name}' failed: {cause}")]
pub struct StepError {
    /// Name of the step that failed or was about to start
    pub step_name: String,

    /// Underlying reason, passed through unclassified
    ///
    /// Already part of the message, so it is not exposed as a source.
    pub cause: FailureCause,
}

impl StepError {
    pub fn new(step_name: impl Into<String>, cause: impl Into<FailureCause>) -> Self {
        Self {
            step_name: step_name.into(),
            cause: cause.into(),
        }
    }

    pub fn cancelled(step_name: impl Into<String>) -> Self {
        Self::new(step_name, FailureCause::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, FailureCause::Cancelled)
    }
}
