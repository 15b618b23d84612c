//! Core domain models
//!
//! This module defines the fundamental data structures that represent
//! pipelines, steps, runs and their configuration.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use error::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
