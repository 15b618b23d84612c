//! Pipeline domain model

use crate::core::{config::PipelineConfig, step::Step};
use anyhow::Result;
use std::collections::HashSet;

/// An ordered list of steps to execute one after another
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Steps in execution order
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Create a pipeline from configuration, validating it first
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.to_pipeline()
    }

    /// Append a step, builder style
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Index of the named step
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }

    /// The sub-pipeline starting at `index`
    ///
    /// Used to resume after a failure by re-running from the failed step.
    /// An index past the end yields an empty pipeline.
    pub fn resume_from(&self, index: usize) -> Pipeline {
        Pipeline {
            name: self.name.clone(),
            steps: self.steps.iter().skip(index).cloned().collect(),
        }
    }

    /// The sub-pipeline starting at the named step
    pub fn resume_from_step(&self, name: &str) -> Option<Pipeline> {
        self.position(name).map(|index| self.resume_from(index))
    }

    /// Check step names are present and unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                anyhow::bail!("Pipeline '{}' has a step with an empty name", self.name);
            }
            if !seen.insert(step.name.as_str()) {
                anyhow::bail!("Duplicate step name: {}", step.name);
            }
        }
        Ok(())
    }
}
