//! Pipeline execution

pub mod events;
pub mod parallel;
pub mod runner;

pub use events::{EventHandler, ExecutionEvent};
pub use parallel::run_all;
pub use runner::SequentialTaskRunner;
