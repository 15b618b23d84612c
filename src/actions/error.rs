//! Action error types

use std::time::Duration;
use thiserror::Error;

/// Error types for step actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with code {code}: {stderr}")]
    Exit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Output did not match expected pattern: {0}")]
    UnexpectedOutput(String),

    #[error("Interrupted by cancellation")]
    Interrupted,

    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    /// Generic failure with a message
    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }
}
