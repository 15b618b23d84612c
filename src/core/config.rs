//! Pipeline configuration from YAML

use crate::actions::{CommandAction, LogAction, OutputPattern, SleepAction, StepAction};
use crate::core::{Pipeline, Step};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Optional pipeline description
    #[serde(default)]
    pub description: Option<String>,

    /// Default timeout for steps (in seconds)
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,

    /// Pipeline steps, in execution order
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step name
    pub name: String,

    /// Optional step description
    #[serde(default)]
    pub description: Option<String>,

    /// What the step does
    pub action: ActionConfig,

    /// Timeout for this step (overrides the pipeline default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Built-in action kinds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionConfig {
    /// Emit a log message
    Log { message: String },

    /// Wait for a fixed delay; exactly one of `millis` or `secs`
    Sleep {
        #[serde(default)]
        millis: Option<u64>,
        #[serde(default)]
        secs: Option<u64>,
    },

    /// Run an external program
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        cwd: Option<String>,
        #[serde(default)]
        env: HashMap<String, String>,
        /// Pattern stdout must contain for the step to succeed
        #[serde(default)]
        expect_output: Option<String>,
        /// Whether to use regex pattern matching
        #[serde(default)]
        use_regex: bool,
    },
}

impl ActionConfig {
    fn validate(&self, step_name: &str) -> Result<()> {
        match self {
            ActionConfig::Log { .. } => {}
            ActionConfig::Sleep { millis, secs } => match (millis, secs) {
                (Some(_), Some(_)) => anyhow::bail!(
                    "Step '{}' sleep action sets both 'millis' and 'secs'",
                    step_name
                ),
                (None, None) => anyhow::bail!(
                    "Step '{}' sleep action needs 'millis' or 'secs'",
                    step_name
                ),
                _ => {}
            },
            ActionConfig::Command {
                program,
                expect_output,
                use_regex,
                ..
            } => {
                if program.trim().is_empty() {
                    anyhow::bail!("Step '{}' command action has an empty program", step_name);
                }
                if let (Some(pattern), true) = (expect_output, *use_regex) {
                    if let Err(e) = Regex::new(pattern) {
                        anyhow::bail!(
                            "Step '{}' has an invalid expect_output regex '{}': {}",
                            step_name,
                            pattern,
                            e
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the runtime action
    pub fn build(&self) -> Result<Arc<dyn StepAction>> {
        let action: Arc<dyn StepAction> = match self {
            ActionConfig::Log { message } => Arc::new(LogAction::new(message.clone())),
            ActionConfig::Sleep { millis, secs } => {
                let duration = match (millis, secs) {
                    (Some(ms), None) => Duration::from_millis(*ms),
                    (None, Some(s)) => Duration::from_secs(*s),
                    _ => anyhow::bail!("sleep action needs exactly one of 'millis' or 'secs'"),
                };
                Arc::new(SleepAction::new(duration))
            }
            ActionConfig::Command {
                program,
                args,
                cwd,
                env,
                expect_output,
                use_regex,
            } => {
                let mut action = CommandAction::new(program.clone()).with_args(args.iter().cloned());
                if let Some(cwd) = cwd {
                    action = action.with_cwd(cwd);
                }
                for (key, value) in env {
                    action = action.with_env(key.clone(), value.clone());
                }
                if let Some(pattern) = expect_output {
                    let pattern = if *use_regex {
                        let regex = Regex::new(pattern).with_context(|| {
                            format!("invalid expect_output regex '{}'", pattern)
                        })?;
                        OutputPattern::Regex(regex)
                    } else {
                        OutputPattern::Simple(pattern.clone())
                    };
                    action = action.expecting(pattern);
                }
                Arc::new(action)
            }
        };
        Ok(action)
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Pipeline name must not be empty");
        }

        let mut seen_names = std::collections::HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                anyhow::bail!("Pipeline '{}' has a step with an empty name", self.name);
            }
            if !seen_names.insert(&step.name) {
                anyhow::bail!("Duplicate step name: {}", step.name);
            }
            if step.timeout_secs == Some(0) {
                anyhow::bail!("Step '{}' has a zero timeout", step.name);
            }
            step.action.validate(&step.name)?;
        }

        if self.default_timeout_secs == Some(0) {
            anyhow::bail!("default_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Validate the config and convert it to a Pipeline domain model
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        self.validate()?;
        let mut pipeline = Pipeline::new(self.name.clone());

        for step_config in &self.steps {
            let action = step_config
                .action
                .build()
                .with_context(|| format!("Step '{}' has an invalid action", step_config.name))?;
            let mut step = Step::from_arc(step_config.name.clone(), action);
            if let Some(secs) = step_config.timeout_secs.or(self.default_timeout_secs) {
                step = step.with_timeout(Duration::from_secs(secs));
            }
            pipeline.push(step);
        }

        Ok(pipeline)
    }
}
