//! Drives one annotation system over one dataset.
//!
//! Documents are processed strictly in dataset order. A failing annotation
//! call is counted and skipped; the run is cancelled only when the failures
//! in the current [`ErrorWindow`] exceed the configured threshold.

use super::matching::{EntityResolver, IdentityResolver, MatchingEngine};
use super::metrics::MetricsAggregator;
use super::result::{ConfigFailure, TaskResult, TaskState};
use super::task::TaskConfiguration;
use crate::config::RunnerConfig;
use crate::dataset::Dataset;
use crate::system::AnnotationSystem;
use crate::types::MarkingSliceExt;
use crate::Result;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

/// Failure counter over consecutive windows of documents.
///
/// A window opens at the first document after a boundary. Its capacity is
/// the window size, or the number of documents still to come if fewer. The
/// rate is failures so far divided by capacity; counters reset when the
/// window is full. A single failure never stops a run: cancellation needs at
/// least two failures in the window and a rate above the threshold.
#[derive(Debug, Clone)]
pub struct ErrorWindow {
    size: usize,
    threshold: f64,
    remaining: usize,
    capacity: usize,
    seen: usize,
    errors: usize,
}

impl ErrorWindow {
    /// Create a window policy over `total` documents.
    #[must_use]
    pub fn new(size: usize, threshold: f64, total: usize) -> Self {
        Self {
            size: size.max(1),
            threshold,
            remaining: total,
            capacity: 0,
            seen: 0,
            errors: 0,
        }
    }

    /// Record one processed document. Returns `true` if the run must stop.
    pub fn record(&mut self, failed: bool) -> bool {
        if self.seen == 0 {
            self.capacity = self.size.min(self.remaining).max(1);
        }
        self.seen += 1;
        self.remaining = self.remaining.saturating_sub(1);
        if failed {
            self.errors += 1;
        }

        if self.errors > 1 && self.rate() > self.threshold {
            return true;
        }
        if self.seen >= self.capacity {
            self.seen = 0;
            self.errors = 0;
        }
        false
    }

    /// Failure rate of the current window.
    pub fn rate(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.errors as f64 / self.capacity as f64
        }
    }

    /// Failures in the current window.
    pub fn errors(&self) -> usize {
        self.errors
    }
}

/// Runs evaluation tasks.
///
/// # Example
///
/// ```rust
/// use kbeval::eval::{MatchingMode, TaskConfiguration, TaskRunner, TaskState, TaskType};
/// use kbeval::{Document, InMemoryDataset, Marking, MockSystem};
///
/// let dataset = InMemoryDataset::new(
///     "tiny",
///     vec![Document::new("Paris", vec![Marking::annotation(0, 5, "Paris")])],
/// );
/// let system = MockSystem::new("echo").with_markings(vec![Marking::annotation(0, 5, "Paris")]);
/// let task = TaskConfiguration::new("echo", "tiny", TaskType::A2KB, MatchingMode::StrongAnnotation);
///
/// let result = TaskRunner::default().run(&task, &system, &dataset);
/// assert_eq!(result.state, TaskState::Finished);
/// assert_eq!(result.micro_f1(), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskRunner {
    config: RunnerConfig,
    engine: MatchingEngine,
}

impl TaskRunner {
    /// Create a runner comparing entities through `resolver`.
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: RunnerConfig, resolver: Arc<dyn EntityResolver>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engine: MatchingEngine::new(resolver),
        })
    }

    /// Create a runner with identity entity comparison.
    ///
    /// Fails if `config` does not validate.
    pub fn with_config(config: RunnerConfig) -> Result<Self> {
        Self::new(config, Arc::new(IdentityResolver))
    }

    /// The cancellation policy.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Evaluate `system` on `dataset`.
    ///
    /// Never fails: configuration problems and cancellations are reported
    /// through the returned result's state.
    pub fn run(
        &self,
        task: &TaskConfiguration,
        system: &dyn AnnotationSystem,
        dataset: &dyn Dataset,
    ) -> TaskResult {
        let strategy = match self.engine.select_strategy(task.matching, task.task) {
            Ok(strategy) => strategy,
            Err(unsupported) => {
                warn!("{}: {}", task, unsupported);
                return TaskResult::configuration_failed(
                    task.clone(),
                    ConfigFailure::UnsupportedMatching,
                    unsupported.to_string(),
                );
            }
        };

        let (texts, gold) = match dataset.aligned_documents() {
            Ok(aligned) => aligned,
            Err(err) => {
                warn!("{}: {}", task, err);
                return TaskResult::configuration_failed(
                    task.clone(),
                    ConfigFailure::InconsistentDataset,
                    err.to_string(),
                );
            }
        };

        info!("Evaluating {} over {} documents", task, texts.len());

        let mut result = TaskResult::new(task.clone());
        result.state = TaskState::Running;
        let mut window = ErrorWindow::new(
            self.config.window_size,
            self.config.error_threshold,
            texts.len(),
        );
        let mut metrics = MetricsAggregator::new();

        for (index, (text, expected)) in texts.iter().zip(gold.iter()).enumerate() {
            result.documents_attempted += 1;

            let output = if task.task.uses_given_mentions() {
                system.disambiguate(text, &expected.spans())
            } else {
                system.annotate(text)
            };

            let failed = match output {
                Ok(predicted) => {
                    metrics.accumulate(self.engine.score(&predicted, expected, &strategy));
                    false
                }
                Err(e) => {
                    result.error_count += 1;
                    debug!("{}: document {} failed: {}", task, index, e);
                    true
                }
            };

            if window.record(failed) {
                warn!(
                    "{}: cancelled after {} documents, {} failures in window (rate {:.2} > {:.2})",
                    task,
                    result.documents_attempted,
                    window.errors(),
                    window.rate(),
                    self.config.error_threshold
                );
                result.state = TaskState::Cancelled;
                result.message = Some(format!(
                    "cancelled: {} of {} documents failed",
                    result.error_count, result.documents_attempted
                ));
                break;
            }
        }

        if result.state == TaskState::Running {
            result.state = TaskState::Finished;
        }

        let measures = metrics.finalize();
        result.results = measures.to_vector();
        result.timestamp = Utc::now();

        info!(
            "{}: {} (micro F1 {:.3}, {} errors / {} documents)",
            task,
            result.state,
            result.micro_f1(),
            result.error_count,
            result.documents_attempted
        );
        result
    }
}
