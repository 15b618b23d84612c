//! CLI output formatting

use crate::{core::RunStatus, execution::ExecutionEvent, persistence::RunSummary};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the total number of steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Format a run summary for display
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = match summary.status {
        RunStatus::Completed => CHECK,
        RunStatus::Failed => CROSS,
        RunStatus::Running => SPINNER,
        RunStatus::Pending => INFO,
    };

    let mut line = format!(
        "{} {} - {} - {} ({}/{}) - {}",
        status_icon,
        style(short_id(&summary.run_id)).dim(),
        style(&summary.pipeline_name).bold(),
        format_status(summary.status),
        summary.completed_steps,
        summary.total_steps,
        style(format!("{:.0}%", summary.progress() * 100.0)).cyan()
    );

    if let (Some(step), Some(error)) = (&summary.failed_step, &summary.error) {
        line.push_str(&format!(" - {}: {}", style(step).red(), style(error).dim()));
    }

    line
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted {
            run_id,
            pipeline_name,
            total_steps,
        } => format!(
            "{} Starting {} ({}, {} steps)",
            ROCKET,
            style(pipeline_name).bold(),
            style(short_id(run_id)).dim(),
            total_steps
        ),
        ExecutionEvent::StepStarted {
            step_name, index, ..
        } => format!(
            "{} {} {}",
            SPINNER,
            style(format!("[{}]", index + 1)).dim(),
            style(step_name).cyan()
        ),
        ExecutionEvent::StepCompleted {
            step_name, elapsed, ..
        } => format!(
            "{} {} {}",
            CHECK,
            style(step_name).green(),
            style(format!("({})", format_elapsed(*elapsed))).dim()
        ),
        ExecutionEvent::StepFailed { error, .. } => format!(
            "{} {}: {}",
            CROSS,
            style(&error.step_name).red(),
            style(&error.cause).dim()
        ),
        ExecutionEvent::RunFinished {
            run_id,
            pipeline_name,
            status,
        } => {
            let status_str = match status {
                RunStatus::Completed => format!("completed {}", style("successfully").green()),
                RunStatus::Failed => style("failed").red().to_string(),
                other => format_status(*other),
            };
            format!(
                "{} {} ({}) {}",
                INFO,
                style(pipeline_name).bold(),
                style(short_id(run_id)).dim(),
                status_str
            )
        }
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    if elapsed.as_secs() == 0 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format_duration(elapsed)
    }
}

/// Format a duration as 5s, 2m 3s or 1h 2m 3s
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
