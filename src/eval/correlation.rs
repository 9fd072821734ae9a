//! Rank correlation between an annotator's scores and dataset properties.
//!
//! For each annotator, its scores across datasets are paired with one
//! metadata dimension of those datasets and compared with Spearman's rank
//! correlation. A positive value means the annotator tends to score higher
//! on datasets with a larger value of that dimension.

use super::result::ResultValue;
use super::table::Table;
use crate::dataset::{DatasetMetaData, MetadataDimension};
use serde::{Deserialize, Serialize};

/// A correlation needs more than this many paired samples.
pub const MIN_SAMPLES: usize = 5;

/// Results of many annotators on many datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsMatrix {
    /// Row headings.
    pub annotators: Vec<String>,
    /// Column headings.
    pub datasets: Vec<String>,
    /// `values[annotator][dataset]`.
    pub values: Vec<Vec<ResultValue>>,
}

impl ResultsMatrix {
    /// A matrix with every cell `NotAvailable`.
    #[must_use]
    pub fn new(annotators: Vec<String>, datasets: Vec<String>) -> Self {
        let values = vec![vec![ResultValue::NotAvailable; datasets.len()]; annotators.len()];
        Self {
            annotators,
            datasets,
            values,
        }
    }

    /// Set one cell. Unknown names are ignored.
    pub fn set(&mut self, annotator: &str, dataset: &str, value: ResultValue) {
        let row = self.annotators.iter().position(|a| a == annotator);
        let col = self.datasets.iter().position(|d| d == dataset);
        if let (Some(r), Some(c)) = (row, col) {
            self.values[r][c] = value;
        }
    }

    /// Render as a table.
    #[must_use]
    pub fn to_table(&self, name: &str) -> Table {
        let mut table = Table::new(name, self.datasets.clone());
        for (annotator, row) in self.annotators.iter().zip(&self.values) {
            table.push_row(annotator.clone(), row.clone());
        }
        table
    }
}

/// Correlation of each annotator with each metadata dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Row headings.
    pub annotators: Vec<String>,
    /// Column dimensions.
    pub dimensions: Vec<MetadataDimension>,
    /// `values[annotator][dimension]`.
    pub values: Vec<Vec<ResultValue>>,
}

impl CorrelationMatrix {
    /// Render as a table with the dimension headings as columns.
    #[must_use]
    pub fn to_table(&self, name: &str) -> Table {
        let headings = self.dimensions.iter().map(|d| d.heading().to_string()).collect();
        let mut table = Table::new(name, headings);
        for (annotator, row) in self.annotators.iter().zip(&self.values) {
            table.push_row(annotator.clone(), row.clone());
        }
        table
    }
}

/// Average ranks (1-based); tied values share the mean of their ranks.
///
/// ```rust
/// use kbeval::eval::correlation::rank;
///
/// assert_eq!(rank(&[10.0, 30.0, 20.0, 30.0]), vec![1.0, 3.5, 2.0, 3.5]);
/// ```
#[must_use]
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j share ranks i+1..=j+1
        let mean = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = mean;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Spearman's rank correlation; `None` if either side has no variance.
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    pearson(&rank(x), &rank(y))
}

/// Computes annotator × metadata-dimension correlations.
#[derive(Debug, Clone)]
pub struct CorrelationAnalyzer {
    dimensions: Vec<MetadataDimension>,
    min_samples: usize,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self {
            dimensions: MetadataDimension::all().to_vec(),
            min_samples: MIN_SAMPLES,
        }
    }
}

impl CorrelationAnalyzer {
    /// Analyzer over all nine dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Correlate every annotator row against every dimension.
    ///
    /// `metadata[i]` describes `results.datasets[i]`. Only datasets where the
    /// annotator has a `Success` value and metadata exists are paired; rows
    /// with `MIN_SAMPLES` or fewer pairs are `NotAvailable` throughout.
    #[must_use]
    pub fn correlate(
        &self,
        results: &ResultsMatrix,
        metadata: &[Option<DatasetMetaData>],
    ) -> CorrelationMatrix {
        let values = results
            .values
            .iter()
            .map(|row| self.correlate_row(row, metadata))
            .collect();

        CorrelationMatrix {
            annotators: results.annotators.clone(),
            dimensions: self.dimensions.clone(),
            values,
        }
    }

    fn correlate_row(
        &self,
        row: &[ResultValue],
        metadata: &[Option<DatasetMetaData>],
    ) -> Vec<ResultValue> {
        let pairs: Vec<(f64, &DatasetMetaData)> = row
            .iter()
            .zip(metadata)
            .filter_map(|(value, meta)| Some((value.value()?, meta.as_ref()?)))
            .collect();

        if pairs.len() <= self.min_samples {
            return vec![ResultValue::NotAvailable; self.dimensions.len()];
        }

        let scores: Vec<f64> = pairs.iter().map(|(score, _)| *score).collect();
        self.dimensions
            .iter()
            .map(|dim| {
                let axis: Vec<f64> = pairs.iter().map(|(_, meta)| meta.value(*dim)).collect();
                spearman(&scores, &axis).map_or(ResultValue::NotAvailable, ResultValue::Success)
            })
            .collect()
    }
}
