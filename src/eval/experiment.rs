//! Run many evaluation tasks in parallel.
//!
//! Each task configuration is an independent unit of work: it resolves its
//! annotator and dataset by name, runs on its own [`TaskRunner`] call, and
//! saves its own result. Units share nothing mutable except the store.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kbeval::eval::{ExperimentRunner, MatchingMode, TaskType};
//! use kbeval::eval::store::{InMemoryResultStore, ResultStore};
//! use kbeval::{Document, EvalConfig, InMemoryDataset, Marking, MockSystem};
//!
//! let mut experiment = ExperimentRunner::new(EvalConfig::sequential()).unwrap();
//! experiment.register_system(Arc::new(MockSystem::new("mock")));
//! experiment.register_dataset(Arc::new(InMemoryDataset::new(
//!     "tiny",
//!     vec![Document::new("Rome", vec![Marking::annotation(0, 4, "Rome")])],
//! )));
//!
//! let store = InMemoryResultStore::new();
//! let tasks = ExperimentRunner::grid(&["mock"], &["tiny"], TaskType::A2KB, MatchingMode::WeakAnnotation);
//! let results = experiment.run_all(&tasks, &store).unwrap();
//!
//! assert_eq!(results.len(), 1);
//! assert!(store.get(results[0].0).is_some());
//! ```

use super::matching::{EntityResolver, IdentityResolver};
use super::result::{ConfigFailure, TaskResult};
use super::runner::TaskRunner;
use super::store::{ResultStore, TaskId};
use super::task::{MatchingMode, TaskConfiguration, TaskType};
use crate::config::EvalConfig;
use crate::dataset::Dataset;
use crate::system::AnnotationSystem;
use crate::{Error, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Annotation systems by name.
#[derive(Default, Clone)]
pub struct SystemRegistry {
    systems: BTreeMap<String, Arc<dyn AnnotationSystem>>,
}

impl SystemRegistry {
    /// Create empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system under its own name, replacing any previous one.
    pub fn register(&mut self, system: Arc<dyn AnnotationSystem>) {
        let name = system.name().to_string();
        if self.systems.insert(name.clone(), system).is_some() {
            log::warn!("Annotator '{}' registered twice; keeping the latest", name);
        }
    }

    /// Look up a system.
    pub fn get(&self, name: &str) -> Result<Arc<dyn AnnotationSystem>> {
        self.systems
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_annotator(name))
    }

    /// Get number of registered systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

/// Datasets by name.
#[derive(Default, Clone)]
pub struct DatasetRegistry {
    datasets: BTreeMap<String, Arc<dyn Dataset>>,
}

impl DatasetRegistry {
    /// Create empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset under its own name, replacing any previous one.
    pub fn register(&mut self, dataset: Arc<dyn Dataset>) {
        let name = dataset.name().to_string();
        if self.datasets.insert(name.clone(), dataset).is_some() {
            log::warn!("Dataset '{}' registered twice; keeping the latest", name);
        }
    }

    /// Look up a dataset.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Dataset>> {
        self.datasets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_dataset(name))
    }

    /// Get number of registered datasets.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Executes task configurations on a worker pool.
pub struct ExperimentRunner {
    config: EvalConfig,
    runner: TaskRunner,
    systems: SystemRegistry,
    datasets: DatasetRegistry,
    next_id: AtomicU64,
}

impl ExperimentRunner {
    /// Create with identity entity comparison.
    pub fn new(config: EvalConfig) -> Result<Self> {
        Self::with_resolver(config, Arc::new(IdentityResolver))
    }

    /// Create with an entity resolver shared by all runs.
    pub fn with_resolver(config: EvalConfig, resolver: Arc<dyn EntityResolver>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            runner: TaskRunner::new(config.runner, resolver)?,
            config,
            systems: SystemRegistry::new(),
            datasets: DatasetRegistry::new(),
            next_id: AtomicU64::new(0),
        })
    }

    /// Start task ids at `first` (e.g. after the ids already in a store).
    #[must_use]
    pub fn starting_at(self, first: TaskId) -> Self {
        self.next_id.store(first, Ordering::SeqCst);
        self
    }

    /// Register an annotation system.
    pub fn register_system(&mut self, system: Arc<dyn AnnotationSystem>) {
        self.systems.register(system);
    }

    /// Register a dataset.
    pub fn register_dataset(&mut self, dataset: Arc<dyn Dataset>) {
        self.datasets.register(dataset);
    }

    /// Registered systems.
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Registered datasets.
    pub fn datasets(&self) -> &DatasetRegistry {
        &self.datasets
    }

    /// Every (annotator, dataset) pair for one task type and matching mode.
    #[must_use]
    pub fn grid(
        annotators: &[&str],
        datasets: &[&str],
        task: TaskType,
        matching: MatchingMode,
    ) -> Vec<TaskConfiguration> {
        annotators
            .iter()
            .flat_map(|a| {
                datasets
                    .iter()
                    .map(move |d| TaskConfiguration::new(*a, *d, task, matching))
            })
            .collect()
    }

    /// Run one task on the calling thread.
    ///
    /// Unknown annotator or dataset names produce a configuration failure.
    pub fn run_task(&self, task: &TaskConfiguration) -> TaskResult {
        let resolved = self
            .systems
            .get(&task.annotator)
            .and_then(|system| self.datasets.get(&task.dataset).map(|dataset| (system, dataset)));

        match resolved {
            Ok((system, dataset)) => self.runner.run(task, system.as_ref(), dataset.as_ref()),
            Err(e) => {
                log::warn!("{}: {}", task, e);
                TaskResult::configuration_failed(
                    task.clone(),
                    ConfigFailure::UnknownComponent,
                    e.to_string(),
                )
            }
        }
    }

    /// Run all tasks on the worker pool and save each result.
    ///
    /// Returns `(task id, result)` in input order.
    pub fn run_all(
        &self,
        tasks: &[TaskConfiguration],
        store: &dyn ResultStore,
    ) -> Result<Vec<(TaskId, TaskResult)>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| Error::config(format!("cannot build worker pool: {}", e)))?;

        log::info!(
            "Running {} tasks on {} workers",
            tasks.len(),
            pool.current_num_threads()
        );

        let results: Vec<(TaskId, TaskResult)> = pool.install(|| {
            tasks
                .par_iter()
                .map(|task| {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    let result = self.run_task(task);
                    store.save(id, result.clone());
                    (id, result)
                })
                .collect()
        });
        Ok(results)
    }
}
