//! Result persistence and dataset metadata lookup.
//!
//! Both are boundary capabilities: real deployments back them with a
//! database or catalog. The in-memory implementations here serve tests and
//! the command line, and load from JSON.

use super::result::TaskResult;
use super::task::{MatchingMode, TaskType};
use crate::dataset::DatasetMetaData;
use crate::sync::{lock, Mutex};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Identifier assigned to a stored task result.
pub type TaskId = u64;

/// Stores task results.
pub trait ResultStore: Send + Sync {
    /// Save (or replace) the result of a task.
    fn save(&self, task_id: TaskId, result: TaskResult);

    /// The latest result per (annotator, dataset) for a task type and
    /// matching mode. Later timestamps win; equal timestamps go to the
    /// higher task id.
    fn latest_results(&self, task: TaskType, matching: MatchingMode) -> Vec<TaskResult>;

    /// The result saved under `task_id`.
    fn get(&self, task_id: TaskId) -> Option<TaskResult>;
}

/// One stored result in the JSON results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    /// Task identifier.
    pub task_id: TaskId,
    /// The result.
    pub result: TaskResult,
}

/// Result store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: Mutex<BTreeMap<TaskId, TaskResult>>,
}

impl InMemoryResultStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        lock(&self.results).len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        lock(&self.results).is_empty()
    }

    /// Next unused task id.
    pub fn next_id(&self) -> TaskId {
        lock(&self.results)
            .keys()
            .next_back()
            .map_or(0, |last| last + 1)
    }

    /// All stored results in task id order.
    pub fn snapshot(&self) -> Vec<StoredResult> {
        lock(&self.results)
            .iter()
            .map(|(task_id, result)| StoredResult {
                task_id: *task_id,
                result: result.clone(),
            })
            .collect()
    }

    /// Parse a JSON array of stored results.
    pub fn from_json(json: &str) -> Result<Self> {
        let stored: Vec<StoredResult> = serde_json::from_str(json)?;
        let store = Self::new();
        for entry in stored {
            store.save(entry.task_id, entry.result);
        }
        Ok(store)
    }

    /// Load a JSON results file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize every stored result as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl ResultStore for InMemoryResultStore {
    fn save(&self, task_id: TaskId, result: TaskResult) {
        lock(&self.results).insert(task_id, result);
    }

    fn latest_results(&self, task: TaskType, matching: MatchingMode) -> Vec<TaskResult> {
        let results = lock(&self.results);
        let mut latest: HashMap<(&str, &str), (TaskId, &TaskResult)> = HashMap::new();

        for (id, result) in results.iter() {
            if result.config.task != task || result.config.matching != matching {
                continue;
            }
            let key = (result.config.annotator.as_str(), result.config.dataset.as_str());
            let newer = latest.get(&key).map_or(true, |(best_id, best)| {
                (result.timestamp, *id) > (best.timestamp, *best_id)
            });
            if newer {
                latest.insert(key, (*id, result));
            }
        }

        let mut out: Vec<TaskResult> = latest.into_values().map(|(_, r)| r.clone()).collect();
        out.sort_by(|a, b| {
            (&a.config.annotator, &a.config.dataset).cmp(&(&b.config.annotator, &b.config.dataset))
        });
        out
    }

    fn get(&self, task_id: TaskId) -> Option<TaskResult> {
        lock(&self.results).get(&task_id).cloned()
    }
}

/// Looks up descriptive metadata of datasets.
pub trait MetadataProvider: Send + Sync {
    /// Metadata of the named dataset, if known.
    fn metadata_for(&self, dataset: &str) -> Option<DatasetMetaData>;
}

/// Metadata held in a map, loadable from a JSON object keyed by dataset name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryMetadata {
    entries: HashMap<String, DatasetMetaData>,
}

impl InMemoryMetadata {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the metadata of a dataset.
    pub fn insert(&mut self, dataset: impl Into<String>, metadata: DatasetMetaData) {
        self.entries.insert(dataset.into(), metadata);
    }

    /// Number of described datasets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no dataset is described.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

impl MetadataProvider for InMemoryMetadata {
    fn metadata_for(&self, dataset: &str) -> Option<DatasetMetaData> {
        self.entries.get(dataset).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{TaskConfiguration, TaskState};
    use chrono::{Duration, Utc};

    fn result(annotator: &str, dataset: &str, f1: f64, age_secs: i64) -> TaskResult {
        let mut r = TaskResult::new(TaskConfiguration::new(
            annotator,
            dataset,
            TaskType::A2KB,
            MatchingMode::WeakAnnotation,
        ));
        r.state = TaskState::Finished;
        r.results[TaskResult::MICRO_F1] = f1;
        r.timestamp = Utc::now() - Duration::seconds(age_secs);
        r
    }

    #[test]
    fn test_latest_by_timestamp() {
        let store = InMemoryResultStore::new();
        store.save(1, result("sys", "ds", 0.9, 10));
        store.save(2, result("sys", "ds", 0.5, 100));

        let latest = store.latest_results(TaskType::A2KB, MatchingMode::WeakAnnotation);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].micro_f1(), 0.9);
    }

    #[test]
    fn test_equal_timestamps_prefer_higher_id() {
        let store = InMemoryResultStore::new();
        let a = result("sys", "ds", 0.1, 0);
        let mut b = result("sys", "ds", 0.2, 0);
        b.timestamp = a.timestamp;
        store.save(7, b);
        store.save(3, a);

        let latest = store.latest_results(TaskType::A2KB, MatchingMode::WeakAnnotation);
        assert_eq!(latest[0].micro_f1(), 0.2);
    }

    #[test]
    fn test_latest_filters_configuration() {
        let store = InMemoryResultStore::new();
        store.save(1, result("sys", "ds", 0.9, 0));
        assert!(store
            .latest_results(TaskType::D2KB, MatchingMode::WeakAnnotation)
            .is_empty());
        assert!(store
            .latest_results(TaskType::A2KB, MatchingMode::StrongAnnotation)
            .is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let store = InMemoryResultStore::new();
        store.save(4, result("sys", "ds", 0.4, 0));
        let loaded = InMemoryResultStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(4).map(|r| r.micro_f1()), Some(0.4));
        assert_eq!(loaded.next_id(), 5);
    }

    #[test]
    fn test_metadata_from_json() {
        let json = r#"{"KORE50": {"number_of_documents": 50, "avg_document_length": 79.0,
            "number_of_entities": 144, "entities_per_doc": 2.88, "entities_per_token": 0.1,
            "amount_of_persons": 74}}"#;
        let provider = InMemoryMetadata::from_json(json).unwrap();
        let kore = provider.metadata_for("KORE50").unwrap();
        assert_eq!(kore.number_of_documents, 50);
        assert_eq!(kore.amount_of_persons, 74);
        assert_eq!(kore.amount_of_others, 0);
        assert!(provider.metadata_for("ACE2004").is_none());
    }
}
