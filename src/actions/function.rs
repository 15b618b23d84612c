//! Closure-backed actions for embedding code directly in a pipeline

use crate::actions::{ActionError, StepAction, StepContext};
use async_trait::async_trait;
use std::future::Future;

/// Adapts a zero-argument async closure into a step action
pub struct FnAction<F> {
    f: F,
}

impl<F, Fut> FnAction<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> StepAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    async fn run(&self, _ctx: &StepContext) -> Result<(), ActionError> {
        (self.f)().await
    }

    fn describe(&self) -> String {
        "closure".to_string()
    }
}
