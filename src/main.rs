use anyhow::{Context, Result};
use std::sync::Arc;
use taskchain::cli::commands::{HistoryCommand, ListCommand, RunCommand, ValidateCommand};
use taskchain::cli::output::*;
use taskchain::cli::{Cli, Command};
use taskchain::core::config::PipelineConfig;
use taskchain::core::{Pipeline, RunStatus};
use taskchain::execution::{run_all, ExecutionEvent, SequentialTaskRunner};
use taskchain::persistence::{
    create_summary, save_summaries, InMemoryPersistence, PersistenceBackend, RunSummary,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipelines(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::List(cmd) => list_pipelines(cmd).await?,
        Command::History(cmd) => show_history(cmd).await?,
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
async fn history_store() -> Result<Arc<dyn PersistenceBackend>> {
    Ok(Arc::new(
        taskchain::persistence::SqliteRunStore::with_default_path().await?,
    ))
}

#[cfg(not(feature = "sqlite"))]
async fn history_store() -> Result<Arc<dyn PersistenceBackend>> {
    warn!("Built without the sqlite feature, history is not persisted");
    Ok(Arc::new(InMemoryPersistence::new()))
}

fn load_pipeline(cmd: &RunCommand, path: &std::path::Path) -> Result<Pipeline> {
    let config = PipelineConfig::from_file(path)
        .with_context(|| format!("Failed to load pipeline config {}", path.display()))?;

    println!(
        "{} Loaded pipeline: {} ({} steps)",
        INFO,
        style(&config.name).bold(),
        config.steps.len()
    );

    let pipeline = Pipeline::from_config(&config)?;
    match &cmd.from_step {
        Some(step) => {
            let resumed = pipeline.resume_from_step(step).with_context(|| {
                format!("Pipeline '{}' has no step named '{}'", pipeline.name, step)
            })?;
            println!(
                "{} Resuming {} from step {}",
                INFO,
                style(&pipeline.name).bold(),
                style(step).cyan()
            );
            Ok(resumed)
        }
        None => Ok(pipeline),
    }
}

async fn run_pipelines(cmd: &RunCommand) -> Result<()> {
    cmd.validate()?;
    let pipelines = cmd
        .files
        .iter()
        .map(|path| load_pipeline(cmd, path))
        .collect::<Result<Vec<_>>>()?;

    let store: Arc<dyn PersistenceBackend> = if cmd.no_history {
        Arc::new(InMemoryPersistence::new())
    } else {
        history_store().await?
    };

    let total_steps: usize = pipelines.iter().map(Pipeline::len).sum();
    let progress = create_progress_bar(total_steps);
    let bar = progress.clone();
    let runner = SequentialTaskRunner::new().with_event_handler(move |event| {
        bar.println(format_execution_event(event));
        if let ExecutionEvent::StepCompleted { .. } = event {
            bar.inc(1);
        }
    });

    // Ctrl-C stops every run before its next step
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling runs");
            on_signal.cancel();
        }
    });

    println!();
    let runs = run_all(&runner, pipelines, cancel).await;
    progress.finish_and_clear();

    let mut failed = 0;
    let mut summaries = Vec::with_capacity(runs.len());
    for run in &runs {
        let summary = create_summary(run);
        println!("{}", format_run_summary(&summary));
        summaries.push(summary);

        if let Some(err) = run.error() {
            failed += 1;
            error!("{}", err);
        }
    }

    // Report every run before touching history
    match save_summaries(store.as_ref(), &summaries).await {
        Ok(()) if !cmd.no_history => println!("\n{} Runs saved to history", INFO),
        Ok(()) => {}
        Err(e) => println!("\n{} {}", WARN, style(format!("{:#}", e)).yellow()),
    }

    if failed > 0 {
        println!(
            "\n{} {} of {} runs {}",
            CROSS,
            failed,
            runs.len(),
            style("failed").red()
        );
        std::process::exit(1);
    }

    println!(
        "\n{} All runs completed {}",
        CHECK,
        style("successfully").green()
    );
    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Steps: {}", style(config.steps.len()).cyan());
            for step in config.to_pipeline()?.steps() {
                println!("    {} {}", style(&step.name).bold(), style(step.describe()).dim());
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

async fn list_pipelines(cmd: &ListCommand) -> Result<()> {
    let store = history_store().await?;
    let pipelines = store.list_pipelines().await?;

    if pipelines.is_empty() {
        println!("{} No pipelines found in history", INFO);
        return Ok(());
    }

    if cmd.json {
        let mut json_data = Vec::new();
        for pipeline in &pipelines {
            let runs = store.list_runs(pipeline).await?;
            json_data.push(serde_json::json!({
                "name": pipeline,
                "run_count": runs.len()
            }));
        }
        let data = serde_json::json!({ "pipelines": json_data });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Pipelines in history:", INFO);
    for pipeline_name in &pipelines {
        if cmd.with_counts {
            let runs = store.list_runs(pipeline_name).await?;
            let completed = runs.iter().filter(|r| r.status == RunStatus::Completed).count();
            let failed = runs.iter().filter(|r| r.status == RunStatus::Failed).count();
            println!(
                "  {} ({} runs: {} succeeded, {} failed)",
                style(pipeline_name).bold(),
                style(runs.len()).cyan(),
                style(completed).green(),
                style(failed).red()
            );
        } else {
            println!("  {}", style(pipeline_name).bold());
        }
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = history_store().await?;

    if let Some(run_id) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id).context("Invalid run ID format")?;
        match store.load_run(run_id).await? {
            Some(summary) => print_run_details(&summary, cmd.json)?,
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    let mut runs = match &cmd.pipeline {
        Some(pipeline_name) => store.list_runs(pipeline_name).await?,
        None => {
            let mut all_runs = Vec::new();
            for pipeline in store.list_pipelines().await? {
                all_runs.extend(store.list_runs(&pipeline).await?);
            }
            all_runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
            all_runs
        }
    };
    runs.truncate(cmd.limit);

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{} Run history (showing latest {}):", INFO, cmd.limit);
        for summary in &runs {
            println!("  {}", format_run_summary(summary));
        }
    }

    Ok(())
}

fn print_run_details(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{} Run Details", INFO);
    println!("  ID: {}", style(summary.run_id).cyan());
    println!("  Pipeline: {}", style(&summary.pipeline_name).bold());
    println!("  Status: {}", format_status(summary.status));
    println!("  Started: {}", style(summary.started_at.to_rfc3339()).dim());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", style(finished.to_rfc3339()).dim());
        if let Ok(duration) = finished.signed_duration_since(summary.started_at).to_std() {
            println!("  Duration: {}", style(format_duration(duration)).dim());
        }
    }
    println!(
        "  Progress: {} ({}/{})",
        style(format!("{:.0}%", summary.progress() * 100.0)).cyan(),
        summary.completed_steps,
        summary.total_steps
    );
    if let (Some(step), Some(error)) = (&summary.failed_step, &summary.error) {
        println!("  Failed at: {}", style(step).red());
        println!("  Error: {}", style(error).dim());
    }

    Ok(())
}
