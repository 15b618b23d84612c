//! Test: Failure Handling - first failure halts the run

use crate::helpers::*;
use taskchain::actions::ActionError;
use taskchain::core::{FailureCause, Pipeline};
use taskchain::execution::SequentialTaskRunner;

fn pipeline_failing_at(n: usize, k: usize, journal: &Journal) -> Pipeline {
    (1..=n).fold(Pipeline::new("failing"), |pipeline, i| {
        let name = format!("step{}", i);
        let step = if i == k {
            failing_step(&name, journal, "boom")
        } else {
            recorded_step(&name, journal)
        };
        pipeline.with_step(step)
    })
}

/// Steps 1..k run, k+1..N never do
#[tokio::test]
async fn test_failure_at_each_position() {
    let n = 5;
    for k in 1..=n {
        let journal = Journal::new();
        let pipeline = pipeline_failing_at(n, k, &journal);

        let run = execute(&pipeline).await;

        let failed_step = format!("step{}", k);
        assert_run_failed_at(&run, &failed_step);
        let expected: Vec<String> = (1..=k).map(|i| format!("step{}", i)).collect();
        assert_eq!(journal.started(), expected);
        assert_eq!(succeeded_steps(&run).len(), k - 1);
        assert_eq!(run.current_step_index(), k - 1);
        assert_eq!(run.resume_point(), Some(k - 1));
    }
}

/// The returned error names the step and carries the action's cause
#[tokio::test]
async fn test_run_returns_step_error() {
    let journal = Journal::new();
    let pipeline = pipeline_failing_at(3, 2, &journal);

    let err = SequentialTaskRunner::new().run(&pipeline).await.unwrap_err();

    assert_eq!(err.step_name, "step2");
    assert_eq!(err.cause, FailureCause::Action(ActionError::failed("boom")));
    assert_eq!(err.to_string(), "step 'step2' failed: boom");
}

/// Re-running from the failed step picks up where the run stopped
#[tokio::test]
async fn test_resume_after_failure() {
    let journal = Journal::new();
    let pipeline = Pipeline::new("flaky")
        .with_step(recorded_step("fetch", &journal))
        .with_step(failing_step("build", &journal, "compiler crashed"))
        .with_step(recorded_step("deploy", &journal));

    let failed = execute(&pipeline).await;
    assert_run_failed_at(&failed, "build");

    // Swap the broken step for a working one, then resume
    let fixed = Pipeline::new("flaky")
        .with_step(recorded_step("fetch", &journal))
        .with_step(recorded_step("build", &journal))
        .with_step(recorded_step("deploy", &journal));
    let resume_at = failed.resume_point().unwrap();
    let resumed = execute(&fixed.resume_from(resume_at)).await;

    assert_run_completed(&resumed);
    assert_eq!(succeeded_steps(&resumed), vec!["build", "deploy"]);
    assert_eq!(
        journal.started(),
        vec!["fetch", "build", "build", "deploy"]
    );
}

/// A finished run is not affected by anything that happens afterwards
#[tokio::test]
async fn test_failed_run_is_stable() {
    let journal = Journal::new();
    let run = execute(&pipeline_failing_at(2, 1, &journal)).await;

    let snapshot = run.clone();
    assert_eq!(run.status(), snapshot.status());
    assert_eq!(run.result(), snapshot.result());
    assert!(run.is_terminal());
    assert!(run.finished_at().is_some());
}
