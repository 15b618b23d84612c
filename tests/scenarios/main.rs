//! Scenario-based tests for the sequential runner

mod helpers;

mod concurrent_runs;
mod failure_handling;
mod success_chain;
mod timeouts;
