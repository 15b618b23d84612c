//! Test: Success Chain - every step succeeds, in order

use crate::helpers::*;
use std::time::{Duration, Instant};
use taskchain::core::config::PipelineConfig;
use taskchain::core::Pipeline;

/// Every step runs exactly once, in list order, never overlapping
#[tokio::test]
async fn test_all_steps_run_once_in_order() {
    for n in [1, 2, 5, 12] {
        let journal = Journal::new();
        let pipeline = numbered_pipeline(n, &journal);

        let run = execute(&pipeline).await;

        assert_run_completed(&run);
        let expected: Vec<String> = (1..=n).map(|i| format!("step{}", i)).collect();
        assert_eq!(journal.started(), expected);
        assert_eq!(succeeded_steps(&run), expected);
        assert_no_overlap(&journal.for_run(run.run_id));
        assert_eq!(journal.max_in_flight(), 1);
        assert_eq!(run.current_step_index(), n);
    }
}

/// Slow steps still never overlap their successors
#[tokio::test(start_paused = true)]
async fn test_slow_steps_do_not_overlap() {
    let journal = Journal::new();
    let pipeline = Pipeline::new("slow")
        .with_step(slow_step("a", &journal, Duration::from_millis(300)))
        .with_step(recorded_step("b", &journal))
        .with_step(slow_step("c", &journal, Duration::from_millis(100)));

    let run = execute(&pipeline).await;

    assert_run_completed(&run);
    assert_eq!(journal.started(), vec!["a", "b", "c"]);
    assert_no_overlap(&journal.for_run(run.run_id));
    assert_eq!(journal.max_in_flight(), 1);
}

/// Zero steps completes immediately
#[tokio::test]
async fn test_empty_pipeline() {
    let journal = Journal::new();
    let run = execute(&numbered_pipeline(0, &journal)).await;

    assert_run_completed(&run);
    assert!(journal.all().is_empty());
    assert!(run.records().is_empty());
    assert_eq!(run.progress(), 1.0);
}

/// sniff, wait, bark
#[tokio::test(start_paused = true)]
async fn test_dog_scenario() {
    let journal = Journal::new();
    let pipeline = Pipeline::new("dog")
        .with_step(recorded_step("sniff", &journal))
        .with_step(slow_step("wait", &journal, Duration::from_secs(1)))
        .with_step(recorded_step("bark", &journal));

    let started = tokio::time::Instant::now();
    let run = execute(&pipeline).await;

    assert_run_completed(&run);
    assert_eq!(journal.started(), vec!["sniff", "wait", "bark"]);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

/// The same scenario loaded from YAML with real actions
#[tokio::test]
async fn test_dog_scenario_from_yaml() {
    let yaml = r#"
name: "dog"
steps:
  - name: "sniff"
    action: { type: log, message: "sniff" }
  - name: "wait"
    action: { type: sleep, millis: 20 }
  - name: "bark"
    action: { type: log, message: "woff woff" }
"#;

    let pipeline = PipelineConfig::from_yaml(yaml).unwrap().to_pipeline().unwrap();

    let started = Instant::now();
    let run = execute(&pipeline).await;

    assert_run_completed(&run);
    assert_eq!(succeeded_steps(&run), vec!["sniff", "wait", "bark"]);
    assert!(started.elapsed() >= Duration::from_millis(20));
}
