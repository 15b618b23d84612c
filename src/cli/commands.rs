//! CLI command definitions

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Run one or more pipelines
///
/// Each file becomes an independent run; all of them execute concurrently.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to a pipeline YAML file (repeatable)
    #[arg(short = 'f', long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Step to start from (for resuming after a failure, single file only)
    #[arg(long)]
    pub from_step: Option<String>,

    /// Don't save runs to history
    #[arg(long)]
    pub no_history: bool,
}

impl RunCommand {
    /// Reject flag combinations clap can't express
    pub fn validate(&self) -> Result<()> {
        if self.from_step.is_some() && self.files.len() > 1 {
            anyhow::bail!(
                "--from-step can only be used with a single pipeline file (got {})",
                self.files.len()
            );
        }
        Ok(())
    }
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List pipelines with run history
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Show run counts
    #[arg(long)]
    pub with_counts: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Pipeline name to filter by
    #[arg(short, long)]
    pub pipeline: Option<String>,

    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Show a specific run by ID
    #[arg(long)]
    pub run_id: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
