//! Error-window cancellation of task runs.

use kbeval::eval::{MatchingMode, TaskConfiguration, TaskRunner, TaskState, TaskType};
use kbeval::{
    AnnotationSystem, Document, Error, InMemoryDataset, Marking, MockSystem, Result,
    RunnerConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};

fn dataset(n: usize) -> InMemoryDataset {
    let docs = (0..n)
        .map(|i| {
            Document::new(
                format!("Rome, document {}", i),
                vec![Marking::annotation(0, 4, "Rome")],
            )
        })
        .collect();
    InMemoryDataset::new("rome", docs)
}

fn task() -> TaskConfiguration {
    TaskConfiguration::new("mock", "rome", TaskType::A2KB, MatchingMode::WeakAnnotation)
}

fn flaky(failures_per_hundred: usize) -> MockSystem {
    MockSystem::new("mock")
        .with_markings(vec![Marking::annotation(0, 4, "Rome")])
        .with_failures_per_hundred(failures_per_hundred)
}

#[test]
fn test_few_failures_finish() {
    let result = TaskRunner::default().run(&task(), &flaky(5), &dataset(100));

    assert!(result.state_code() >= 0);
    assert_eq!(result.state, TaskState::Finished);
    assert_eq!(result.error_count, 5);
    assert_eq!(result.documents_attempted, 100);
}

#[test]
fn test_many_failures_cancel_early() {
    let system = flaky(30);
    let result = TaskRunner::default().run(&task(), &system, &dataset(1000));

    assert!(result.state_code() < 0);
    assert_eq!(result.state, TaskState::Cancelled);
    assert!(result.documents_attempted < 1000);
    // 21 failures out of a 100-document window first exceeds 20%.
    assert_eq!(result.error_count, 21);
    assert_eq!(system.calls(), result.documents_attempted);
    assert!(result.message.is_some());
}

#[test]
fn test_cancelled_run_keeps_partial_metrics() {
    // The first 21 calls fail; nothing has been scored yet.
    let result = TaskRunner::default().run(&task(), &flaky(30), &dataset(1000));
    assert_eq!(result.results, [0.0; 6]);

    // A smaller window: failures land after some successes.
    let system = FailAfter::new(5);
    let runner = TaskRunner::with_config(RunnerConfig::default().with_window_size(10)).unwrap();
    let result = runner.run(&task(), &system, &dataset(100));
    assert_eq!(result.state, TaskState::Cancelled);
    assert_eq!(result.documents_attempted, 8);
    assert_eq!(result.error_count, 3);
    assert_eq!(result.micro_f1(), 1.0);
}

#[test]
fn test_custom_window_and_threshold() {
    let config = RunnerConfig::default()
        .with_window_size(10)
        .with_error_threshold(0.3);
    let runner = TaskRunner::with_config(config).unwrap();
    let result = runner.run(&task(), &flaky(30), &dataset(1000));

    assert_eq!(result.state, TaskState::Cancelled);
    assert_eq!(result.documents_attempted, 4);
    assert_eq!(result.error_count, 4);
}

#[test]
fn test_tolerant_config_never_cancels() {
    let runner = TaskRunner::with_config(RunnerConfig::tolerant()).unwrap();
    let result = runner.run(&task(), &flaky(100), &dataset(250));

    assert_eq!(result.state, TaskState::Finished);
    assert_eq!(result.error_count, 250);
    assert_eq!(result.documents_attempted, 250);
}

/// Succeeds for the first `n` calls, then always fails.
struct FailAfter {
    n: usize,
    calls: AtomicUsize,
}

impl FailAfter {
    fn new(n: usize) -> Self {
        Self {
            n,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AnnotationSystem for FailAfter {
    fn name(&self) -> &str {
        "fail-after"
    }

    fn annotate(&self, _text: &str) -> Result<Vec<Marking>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.n {
            Ok(vec![Marking::annotation(0, 4, "Rome")])
        } else {
            Err(Error::annotation("service unavailable"))
        }
    }
}

#[test]
fn test_trailing_window_judged_by_its_own_size() {
    // 110 documents: the first window of 100 is clean, the trailing window
    // holds 10. Failing from document 100 on, the third failure is 30% of
    // the trailing window.
    let system = FailAfter::new(100);
    let result = TaskRunner::default().run(&task(), &system, &dataset(110));

    assert_eq!(result.state, TaskState::Cancelled);
    assert_eq!(result.documents_attempted, 103);
    assert_eq!(result.error_count, 3);
}

#[test]
fn test_lone_failure_in_trailing_window_finishes() {
    // 101 documents: only the last one, alone in its window, fails.
    let result = TaskRunner::default().run(&task(), &FailAfter::new(100), &dataset(101));

    assert_eq!(result.state, TaskState::Finished);
    assert_eq!(result.documents_attempted, 101);
    assert_eq!(result.error_count, 1);
}

#[test]
fn test_short_dataset_tolerates_one_failure() {
    let result = TaskRunner::default().run(&task(), &flaky(100), &dataset(3));

    // One failure is tolerated; the second in a 3-document window is not.
    assert_eq!(result.state, TaskState::Cancelled);
    assert_eq!(result.documents_attempted, 2);

    let result = TaskRunner::default().run(&task(), &flaky(1), &dataset(3));
    assert_eq!(result.state, TaskState::Finished);
    assert_eq!(result.documents_attempted, 3);
    assert_eq!(result.error_count, 1);
}

#[test]
fn test_window_counters_reset_between_windows() {
    // 20 failures per 100 is exactly the threshold in every window.
    let result = TaskRunner::default().run(&task(), &flaky(20), &dataset(500));

    assert_eq!(result.state, TaskState::Finished);
    assert_eq!(result.error_count, 100);
}

#[test]
fn test_error_count_never_exceeds_attempted() {
    for failures in [0, 10, 25, 50, 100] {
        for size in [0, 1, 7, 150] {
            let result = TaskRunner::default().run(&task(), &flaky(failures), &dataset(size));
            assert!(
                result.error_count <= result.documents_attempted,
                "failures={} size={}",
                failures,
                size
            );
            assert!(result.documents_attempted <= size);
        }
    }
}
