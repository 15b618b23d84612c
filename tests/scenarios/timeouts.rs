//! Test: Timeouts - a deadline is an ordinary step failure

use crate::helpers::*;
use std::time::Duration;
use taskchain::actions::ActionError;
use taskchain::core::config::PipelineConfig;
use taskchain::core::{FailureCause, Pipeline};

#[tokio::test(start_paused = true)]
async fn test_step_timeout_halts_run() {
    let journal = Journal::new();
    let pipeline = Pipeline::new("slow")
        .with_step(recorded_step("first", &journal))
        .with_step(
            slow_step("stuck", &journal, Duration::from_secs(60))
                .with_timeout(Duration::from_secs(1)),
        )
        .with_step(recorded_step("never", &journal));

    let run = execute(&pipeline).await;

    assert_run_failed_at(&run, "stuck");
    assert_eq!(
        run.error().unwrap().cause,
        FailureCause::Action(ActionError::Timeout(Duration::from_secs(1)))
    );
    assert_eq!(journal.started(), vec!["first", "stuck"]);
}

#[tokio::test(start_paused = true)]
async fn test_step_within_timeout_succeeds() {
    let journal = Journal::new();
    let pipeline = Pipeline::new("quick").with_step(
        slow_step("fast", &journal, Duration::from_millis(100))
            .with_timeout(Duration::from_secs(1)),
    );

    assert_run_completed(&execute(&pipeline).await);
}

/// The pipeline default applies to steps that don't set their own
#[tokio::test(start_paused = true)]
async fn test_default_timeout_from_yaml() {
    let yaml = r#"
name: "sleepy"
default_timeout_secs: 1
steps:
  - name: "nap"
    action: { type: sleep, secs: 5 }
  - name: "after"
    action: { type: log, message: "unreachable" }
"#;

    let pipeline = PipelineConfig::from_yaml(yaml).unwrap().to_pipeline().unwrap();
    let run = execute(&pipeline).await;

    assert_run_failed_at(&run, "nap");
    assert_eq!(
        run.error().unwrap().cause,
        FailureCause::Action(ActionError::Timeout(Duration::from_secs(1)))
    );
    assert!(succeeded_steps(&run).is_empty());
}
