//! Experiment overview: latest results and their correlation with dataset
//! properties, for one task type and matching mode.

use super::correlation::{CorrelationAnalyzer, CorrelationMatrix, ResultsMatrix};
use super::result::ResultValue;
use super::store::{MetadataProvider, ResultStore};
use super::table::Table;
use super::task::{MatchingMode, TaskType};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the results table.
pub const RESULTS_TABLE: &str = "Micro F1-measure";
/// Name of the correlation table.
pub const CORRELATIONS_TABLE: &str = "Correlations";

impl ResultsMatrix {
    /// Build the annotator × dataset matrix of the latest results.
    ///
    /// Annotators and datasets are sorted by name. A finished run contributes
    /// its micro F1, any other run its state code, and a missing pair stays
    /// `NotAvailable`.
    pub fn from_latest(store: &dyn ResultStore, task: TaskType, matching: MatchingMode) -> Self {
        let latest = store.latest_results(task, matching);

        let annotators: BTreeSet<&str> = latest.iter().map(|r| r.config.annotator.as_str()).collect();
        let datasets: BTreeSet<&str> = latest.iter().map(|r| r.config.dataset.as_str()).collect();

        let mut matrix = ResultsMatrix::new(
            annotators.into_iter().map(String::from).collect(),
            datasets.into_iter().map(String::from).collect(),
        );
        for result in &latest {
            matrix.set(
                &result.config.annotator,
                &result.config.dataset,
                ResultValue::from(result),
            );
        }
        matrix
    }
}

/// Results and correlations for one (task type, matching mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// Task type.
    pub task: TaskType,
    /// Matching mode.
    pub matching: MatchingMode,
    /// Latest micro F1 per annotator and dataset.
    pub results: ResultsMatrix,
    /// Correlation of each annotator with dataset properties.
    pub correlations: CorrelationMatrix,
}

impl Overview {
    /// Assemble the overview from stored results and dataset metadata.
    pub fn build(
        store: &dyn ResultStore,
        metadata: &dyn MetadataProvider,
        task: TaskType,
        matching: MatchingMode,
    ) -> Self {
        let results = ResultsMatrix::from_latest(store, task, matching);
        let described: Vec<_> = results
            .datasets
            .iter()
            .map(|d| metadata.metadata_for(d))
            .collect();
        let missing = described.iter().filter(|m| m.is_none()).count();
        if missing > 0 {
            log::debug!("{} of {} datasets have no metadata", missing, described.len());
        }

        let correlations = CorrelationAnalyzer::new().correlate(&results, &described);
        log::info!(
            "Overview for {} / {}: {} annotators, {} datasets",
            task,
            matching,
            results.annotators.len(),
            results.datasets.len()
        );

        Self {
            task,
            matching,
            results,
            correlations,
        }
    }

    /// The results and correlation tables, in that order.
    #[must_use]
    pub fn tables(&self) -> [Table; 2] {
        [
            self.results.to_table(RESULTS_TABLE),
            self.correlations.to_table(CORRELATIONS_TABLE),
        ]
    }

    /// JSON array of the two tables, each an array of string rows.
    pub fn to_json(&self) -> Result<String> {
        let rows: Vec<Vec<Vec<String>>> = self.tables().iter().map(Table::to_rows).collect();
        Ok(serde_json::to_string(&rows)?)
    }
}
