//! Running several pipelines side by side as independent runs

use crate::{
    core::{Pipeline, Run},
    execution::runner::SequentialTaskRunner,
};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Execute each pipeline as its own run, all at once
///
/// Every run keeps its own strict step ordering; runs only share the
/// cancellation token. Returns the terminal runs in input order.
pub async fn run_all(
    runner: &SequentialTaskRunner,
    pipelines: Vec<Pipeline>,
    cancel: CancellationToken,
) -> Vec<Run> {
    let total = pipelines.len();
    info!("Launching {} pipelines in parallel", total);

    let mut set = JoinSet::new();
    for (index, pipeline) in pipelines.into_iter().enumerate() {
        let runner = runner.clone();
        let cancel = cancel.clone();
        set.spawn(async move { (index, runner.execute(&pipeline, cancel).await) });
    }

    let mut runs: Vec<Option<Run>> = (0..total).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, run)) => runs[index] = Some(run),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => error!("Run task ended unexpectedly: {}", e),
        }
    }

    runs.into_iter().flatten().collect()
}
