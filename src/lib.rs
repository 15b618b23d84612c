//! taskchain - run pipelines of async steps strictly in order

pub mod actions;
pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;

// Re-export commonly used types
pub use actions::{ActionError, StepAction, StepContext};
pub use core::{FailureCause, Pipeline, Run, RunStatus, Step, StepError};
pub use execution::{run_all, ExecutionEvent, SequentialTaskRunner};
