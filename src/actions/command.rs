//! Command action - runs an external program as a subprocess

use crate::actions::{ActionError, StepAction, StepContext};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, warn};

/// Pattern that a command's stdout must contain
#[derive(Debug, Clone)]
pub enum OutputPattern {
    /// Simple string contains match
    Simple(String),
    /// Regular expression match
    Regex(Regex),
}

impl OutputPattern {
    /// Check if the pattern matches the given text
    pub fn matches(&self, text: &str) -> bool {
        match self {
            OutputPattern::Simple(pattern) => text.contains(pattern),
            OutputPattern::Regex(regex) => regex.is_match(text),
        }
    }

    pub fn display(&self) -> String {
        match self {
            OutputPattern::Simple(s) => s.clone(),
            OutputPattern::Regex(r) => format!("[regex: {}]", r.as_str()),
        }
    }
}

/// Spawns a program and waits for it to exit
///
/// The step succeeds when the program exits with status zero and, if an
/// expected output pattern is set, its stdout matches.
#[derive(Debug, Clone)]
pub struct CommandAction {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: HashMap<String, String>,
    expect_output: Option<OutputPattern>,
}

impl CommandAction {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: HashMap::new(),
            expect_output: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn expecting(mut self, pattern: OutputPattern) -> Self {
        self.expect_output = Some(pattern);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl StepAction for CommandAction {
    async fn run(&self, ctx: &StepContext) -> Result<(), ActionError> {
        debug!(
            "Step {} spawning {} {:?}",
            ctx.step_name, self.program, self.args
        );

        let mut command = Command::new(&self.program);
        command.args(&self.args).envs(&self.env).kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        // Dropping the output future kills the child
        let output = tokio::select! {
            biased;

            _ = ctx.cancellation().cancelled() => {
                debug!("Step {} command interrupted", ctx.step_name);
                return Err(ActionError::Interrupted);
            }
            result = command.output() => result.map_err(|e| ActionError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            warn!(
                "{} exited with code {}: {}",
                self.program,
                code,
                stderr.trim()
            );
            return Err(ActionError::Exit {
                program: self.program.clone(),
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{} returned {} bytes of output", self.program, stdout.len());

        if let Some(pattern) = &self.expect_output {
            if !pattern.matches(&stdout) {
                return Err(ActionError::UnexpectedOutput(pattern.display()));
            }
        }

        Ok(())
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            format!("command {}", self.program)
        } else {
            format!("command {} {}", self.program, self.args.join(" "))
        }
    }
}
