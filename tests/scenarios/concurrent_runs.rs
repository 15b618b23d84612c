//! Test: Concurrent Runs - independent runs never interleave internally

use crate::helpers::*;
use std::time::Duration;
use taskchain::core::{Pipeline, RunStatus};
use taskchain::execution::{run_all, SequentialTaskRunner};
use tokio_util::sync::CancellationToken;

fn staggered_pipeline(journal: &Journal) -> Pipeline {
    Pipeline::new("staggered")
        .with_step(slow_step("one", journal, Duration::from_millis(30)))
        .with_step(slow_step("two", journal, Duration::from_millis(10)))
        .with_step(slow_step("three", journal, Duration::from_millis(20)))
}

/// Two runs of one pipeline through one runner keep their own order
#[tokio::test(start_paused = true)]
async fn test_same_pipeline_twice() {
    let journal = Journal::new();
    let pipeline = staggered_pipeline(&journal);
    let runner = SequentialTaskRunner::new();

    let (first, second) = tokio::join!(
        runner.execute(&pipeline, CancellationToken::new()),
        runner.execute(&pipeline, CancellationToken::new()),
    );

    assert_ne!(first.run_id, second.run_id);
    for run in [&first, &second] {
        assert_run_completed(run);
        assert_no_overlap(&journal.for_run(run.run_id));
        assert_eq!(succeeded_steps(run), vec!["one", "two", "three"]);
    }

    // The runs really did run side by side
    assert_eq!(journal.max_in_flight(), 2);
}

/// Spawned runs on a multi-threaded runtime keep their own order
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_runs_in_parallel() {
    let journal = Journal::new();
    let pipelines: Vec<Pipeline> = (0..8).map(|_| staggered_pipeline(&journal)).collect();

    let runs = run_all(&SequentialTaskRunner::new(), pipelines, CancellationToken::new()).await;

    assert_eq!(runs.len(), 8);
    for run in &runs {
        assert_run_completed(run);
        assert_no_overlap(&journal.for_run(run.run_id));
    }
}

/// A failing run leaves its neighbour untouched
#[tokio::test(start_paused = true)]
async fn test_failure_is_isolated() {
    let journal = Journal::new();
    let failing = Pipeline::new("sass")
        .with_step(slow_step("compile", &journal, Duration::from_millis(10)))
        .with_step(failing_step("minify", &journal, "bad css"));
    let healthy = staggered_pipeline(&journal);

    let runs = run_all(
        &SequentialTaskRunner::new(),
        vec![failing, healthy],
        CancellationToken::new(),
    )
    .await;

    assert_run_failed_at(&runs[0], "minify");
    assert_run_completed(&runs[1]);
}

/// One token cancels every run
#[tokio::test(start_paused = true)]
async fn test_shared_cancellation() {
    let journal = Journal::new();
    let cancel = CancellationToken::new();
    let pipelines = vec![staggered_pipeline(&journal), staggered_pipeline(&journal)];

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(15)).await;
        canceller.cancel();
    });

    let runs = run_all(&SequentialTaskRunner::new(), pipelines, cancel).await;

    for run in &runs {
        assert_eq!(run.status(), RunStatus::Failed);
        assert!(run.error().unwrap().is_cancelled());
        assert_eq!(run.error().unwrap().step_name, "two");
        assert_eq!(succeeded_steps(run), vec!["one"]);
    }
}
