//! Micro and macro precision/recall/F1 over per-document match counts.
//!
//! Micro statistics sum counts across documents before dividing; macro
//! statistics compute P/R/F1 per document and average them.
//!
//! # Empty documents
//!
//! | TP+FP | TP+FN | Precision | Recall | F1 |
//! |-------|-------|-----------|--------|----|
//! | 0 | 0 | undefined | undefined | undefined |
//! | 0 | > 0 | 0 | 0 | 0 |
//! | > 0 | 0 | 0 | undefined | 0 |
//!
//! Undefined per-document values are left out of macro averages. In the
//! six-value result vector an undefined value is reported as `0.0`.

use super::matching::MatchCounts;
use serde::{Deserialize, Serialize};

/// Precision, recall and F1; `None` where the value is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrfScores {
    /// Precision
    pub precision: Option<f64>,
    /// Recall
    pub recall: Option<f64>,
    /// F1 (harmonic mean of precision and recall)
    pub f1: Option<f64>,
}

impl PrfScores {
    /// Compute P/R/F1 from counts.
    #[must_use]
    pub fn from_counts(counts: &MatchCounts) -> Self {
        let tp = counts.true_positives as f64;
        let predicted = counts.predicted();
        let expected = counts.expected();

        let precision = match (predicted, expected) {
            (0, 0) => None,
            (0, _) => Some(0.0),
            (p, _) => Some(tp / p as f64),
        };
        let recall = match (expected, predicted) {
            (0, 0) => None,
            (0, _) => Some(0.0),
            (e, _) => Some(tp / e as f64),
        };

        let f1 = match (precision, recall) {
            (None, None) => None,
            (p, r) => {
                let (p, r) = (p.unwrap_or(0.0), r.unwrap_or(0.0));
                if p + r > 0.0 {
                    Some(2.0 * p * r / (p + r))
                } else {
                    Some(0.0)
                }
            }
        };

        Self {
            precision,
            recall,
            f1,
        }
    }
}

/// Final statistics of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    /// Statistics over summed counts.
    pub micro: PrfScores,
    /// Per-document statistics averaged over documents where defined.
    pub macro_avg: PrfScores,
    /// Summed counts.
    pub counts: MatchCounts,
    /// Number of documents accumulated.
    pub documents: usize,
}

impl Measures {
    /// `[microF1, microP, microR, macroF1, macroP, macroR]`, undefined as `0.0`.
    #[must_use]
    pub fn to_vector(&self) -> [f64; 6] {
        let v = |x: Option<f64>| x.unwrap_or(0.0);
        [
            v(self.micro.f1),
            v(self.micro.precision),
            v(self.micro.recall),
            v(self.macro_avg.f1),
            v(self.macro_avg.precision),
            v(self.macro_avg.recall),
        ]
    }
}

/// Running mean over defined values.
#[derive(Debug, Clone, Copy, Default)]
struct DefinedMean {
    sum: f64,
    n: usize,
}

impl DefinedMean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(x) = value {
            self.sum += x;
            self.n += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Folds per-document counts into [`Measures`].
///
/// ```rust
/// use kbeval::eval::{MatchCounts, MetricsAggregator};
///
/// let mut agg = MetricsAggregator::new();
/// agg.accumulate(MatchCounts::new(3, 1, 0));
/// agg.accumulate(MatchCounts::new(1, 0, 3));
///
/// let m = agg.finalize();
/// assert_eq!(m.micro.precision, Some(0.8));
/// assert_eq!(m.micro.recall, Some(4.0 / 7.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    total: MatchCounts,
    documents: usize,
    precision: DefinedMean,
    recall: DefinedMean,
    f1: DefinedMean,
}

impl MetricsAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document's counts.
    pub fn accumulate(&mut self, counts: MatchCounts) {
        let doc = PrfScores::from_counts(&counts);
        self.precision.push(doc.precision);
        self.recall.push(doc.recall);
        self.f1.push(doc.f1);
        self.total += counts;
        self.documents += 1;
    }

    /// Number of documents accumulated so far.
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Compute the statistics of everything accumulated so far.
    #[must_use]
    pub fn finalize(&self) -> Measures {
        Measures {
            micro: PrfScores::from_counts(&self.total),
            macro_avg: PrfScores {
                precision: self.precision.mean(),
                recall: self.recall.mean(),
                f1: self.f1.mean(),
            },
            counts: self.total,
            documents: self.documents,
        }
    }
}
