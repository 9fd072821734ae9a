//! Matching strategies: how system output is compared to gold markings.
//!
//! # Strategies
//!
//! ```text
//! Gold:      [====Berlin====]            entity=Berlin
//!                 10        16
//!
//! Pred A:    [====Berlin====]            entity=Berlin      (exact)
//! Pred B:    [======Berlin Wall======]   entity=Berlin      (overlap)
//! Pred C:                   [=Germany=]  entity=Berlin      (no overlap)
//!
//!                      Weak     Strong   Tag
//! Pred A               ✓        ✓        ✓
//! Pred B               ✓        ✗        ✓
//! Pred C               ✗        ✗        ✓
//! ```
//!
//! | Strategy | Span | Entity | Valid task types |
//! |----------|------|--------|------------------|
//! | **WeakAnnotationMatch** | Overlap | Same | A2KB, Sa2KB |
//! | **StrongAnnotationMatch** | Exact | Same | D2KB, A2KB, Sa2KB |
//! | **StrongTagMatch** | Ignored | Same | C2KB, Rc2KB, Sc2KB |
//!
//! # Assignment
//!
//! Every gold marking and every prediction takes part in at most one match.
//! Predictions are visited by descending confidence (unscored ones after,
//! in input order); each claims the first still-unmatched gold marking it
//! relates to. Under weak matching the best-scoring overlapping prediction
//! decides a gold marking: if its entity differs, the gold marking stays
//! unmatched.
//!
//! # Example
//!
//! ```rust
//! use kbeval::eval::matching::{select_strategy, MatchingEngine};
//! use kbeval::eval::{MatchingMode, TaskType};
//! use kbeval::Marking;
//!
//! let engine = MatchingEngine::default();
//! let strategy = select_strategy(MatchingMode::WeakAnnotation, TaskType::A2KB).unwrap();
//!
//! let gold = vec![Marking::annotation(10, 6, "Berlin")];
//! let predicted = vec![Marking::annotation(10, 11, "Berlin")];
//!
//! let counts = engine.score(&predicted, &gold, &strategy);
//! assert_eq!(counts.true_positives, 1);
//!
//! // Weak matching is meaningless when position is not part of the task.
//! assert!(select_strategy(MatchingMode::WeakAnnotation, TaskType::C2KB).is_err());
//! ```

use super::task::{MatchingMode, TaskType};
use crate::types::MarkingSliceExt;
use crate::{EntityId, Error, Marking};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

// =============================================================================
// Entity resolution
// =============================================================================

/// Canonicalises entity identifiers before comparison.
///
/// Knowledge bases have aliases and redirects ("Berlin_(city)" → "Berlin");
/// two markings link the same entity when their resolved identifiers are
/// equal.
pub trait EntityResolver: Send + Sync {
    /// Canonical form of `id`.
    fn resolve(&self, id: &EntityId) -> EntityId;
}

/// Compares identifiers as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl EntityResolver for IdentityResolver {
    fn resolve(&self, id: &EntityId) -> EntityId {
        id.clone()
    }
}

/// Resolves identifiers through a redirect table.
///
/// Redirect chains are followed; a cycle stops at the first repeated id.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    redirects: HashMap<EntityId, EntityId>,
}

impl MapResolver {
    /// Create an empty redirect table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a redirect `from → to`.
    #[must_use]
    pub fn with_redirect(mut self, from: impl Into<EntityId>, to: impl Into<EntityId>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    /// Number of redirects.
    pub fn len(&self) -> usize {
        self.redirects.len()
    }

    /// Check if there are no redirects.
    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty()
    }
}

impl EntityResolver for MapResolver {
    fn resolve(&self, id: &EntityId) -> EntityId {
        let mut current = id;
        let mut visited = vec![id];
        while let Some(next) = self.redirects.get(current) {
            if visited.contains(&next) {
                break;
            }
            visited.push(next);
            current = next;
        }
        current.clone()
    }
}

// =============================================================================
// Strategy selection
// =============================================================================

/// How a prediction relates to a gold marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchRelation {
    /// Overlapping spans, same entity.
    WeakAnnotationMatch,
    /// Identical spans, same entity.
    StrongAnnotationMatch,
    /// Same entity, position ignored.
    StrongTagMatch,
}

impl MatchRelation {
    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MatchRelation::WeakAnnotationMatch => "WeakAnnotationMatch",
            MatchRelation::StrongAnnotationMatch => "StrongAnnotationMatch",
            MatchRelation::StrongTagMatch => "StrongTagMatch",
        }
    }
}

/// A match relation bound to the task type it was selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchStrategy {
    /// The relation applied to each (prediction, gold) pair.
    pub relation: MatchRelation,
    /// The task type this strategy scores.
    pub task: TaskType,
}

/// A (matching mode, task type) pair with no valid strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedMatching {
    /// Requested matching mode.
    pub matching: MatchingMode,
    /// Requested task type.
    pub task: TaskType,
}

impl fmt::Display for UnsupportedMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matching {} is not supported for task type {}",
            self.matching, self.task
        )
    }
}

impl std::error::Error for UnsupportedMatching {}

impl From<UnsupportedMatching> for Error {
    fn from(u: UnsupportedMatching) -> Self {
        Error::UnsupportedMatching {
            matching: u.matching.to_string(),
            task: u.task.to_string(),
        }
    }
}

/// Select the strategy for a matching mode and task type.
///
/// - Weak annotation matching needs positions and linking: task ⊇ A2KB.
/// - Strong annotation matching needs exact mentions: task ⊇ D2KB.
/// - Strong entity matching scores entity sets only: Sc2KB ⊇ task.
pub fn select_strategy(
    matching: MatchingMode,
    task: TaskType,
) -> Result<MatchStrategy, UnsupportedMatching> {
    let relation = match matching {
        MatchingMode::WeakAnnotation if task.contains(TaskType::A2KB) => {
            Some(MatchRelation::WeakAnnotationMatch)
        }
        MatchingMode::StrongAnnotation if task.contains(TaskType::D2KB) => {
            Some(MatchRelation::StrongAnnotationMatch)
        }
        MatchingMode::StrongEntity if TaskType::Sc2KB.contains(task) => {
            Some(MatchRelation::StrongTagMatch)
        }
        _ => None,
    };
    relation
        .map(|relation| MatchStrategy { relation, task })
        .ok_or(UnsupportedMatching { matching, task })
}

// =============================================================================
// Counting
// =============================================================================

/// True/false positive/negative counts for one or more documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchCounts {
    /// Gold markings matched by a prediction.
    pub true_positives: usize,
    /// Predictions matching no gold marking.
    pub false_positives: usize,
    /// Gold markings matched by no prediction.
    pub false_negatives: usize,
}

impl MatchCounts {
    /// Create counts.
    #[must_use]
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    /// Number of predictions (TP + FP).
    #[must_use]
    pub fn predicted(&self) -> usize {
        self.true_positives + self.false_positives
    }

    /// Number of gold markings (TP + FN).
    #[must_use]
    pub fn expected(&self) -> usize {
        self.true_positives + self.false_negatives
    }
}

impl Add for MatchCounts {
    type Output = MatchCounts;

    fn add(self, rhs: MatchCounts) -> MatchCounts {
        MatchCounts {
            true_positives: self.true_positives + rhs.true_positives,
            false_positives: self.false_positives + rhs.false_positives,
            false_negatives: self.false_negatives + rhs.false_negatives,
        }
    }
}

impl AddAssign for MatchCounts {
    fn add_assign(&mut self, rhs: MatchCounts) {
        *self = *self + rhs;
    }
}

/// Compares system output against gold markings.
///
/// Holds the entity resolver shared by all comparisons; strategies
/// themselves are stateless.
#[derive(Clone)]
pub struct MatchingEngine {
    resolver: Arc<dyn EntityResolver>,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(Arc::new(IdentityResolver))
    }
}

impl fmt::Debug for MatchingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchingEngine").finish_non_exhaustive()
    }
}

impl MatchingEngine {
    /// Create an engine that compares entities through `resolver`.
    #[must_use]
    pub fn new(resolver: Arc<dyn EntityResolver>) -> Self {
        Self { resolver }
    }

    /// Select the strategy for a matching mode and task type.
    pub fn select_strategy(
        &self,
        matching: MatchingMode,
        task: TaskType,
    ) -> Result<MatchStrategy, UnsupportedMatching> {
        select_strategy(matching, task)
    }

    /// Count TP/FP/FN of `predicted` against `gold`.
    #[must_use]
    pub fn score(&self, predicted: &[Marking], gold: &[Marking], strategy: &MatchStrategy) -> MatchCounts {
        match strategy.relation {
            MatchRelation::WeakAnnotationMatch => self.match_overlapping(predicted, gold),
            MatchRelation::StrongAnnotationMatch => self.match_exact(predicted, gold),
            MatchRelation::StrongTagMatch => self.match_tags(predicted, gold),
        }
    }

    fn resolve(&self, marking: &Marking) -> Option<EntityId> {
        marking.entity().map(|e| self.resolver.resolve(e))
    }

    /// Greedy one-to-one assignment on exact spans and equal entities.
    fn match_exact(&self, predicted: &[Marking], gold: &[Marking]) -> MatchCounts {
        let gold_entities: Vec<Option<EntityId>> = gold.iter().map(|g| self.resolve(g)).collect();
        let mut gold_matched = vec![false; gold.len()];
        let mut tp = 0;

        for pred in predicted.sorted_by_score() {
            let pred_span = pred.position();
            let pred_entity = self.resolve(pred);

            let hit = gold.iter().enumerate().position(|(i, g)| {
                !gold_matched[i] && pred_span == g.position() && pred_entity == gold_entities[i]
            });

            if let Some(i) = hit {
                gold_matched[i] = true;
                tp += 1;
            }
        }

        MatchCounts::new(tp, predicted.len() - tp, gold.len() - tp)
    }

    /// Overlap matching decided by the best-scoring prediction.
    ///
    /// Predictions are visited by descending score. Each one decides every
    /// still-open gold marking it overlaps: it claims the first whose entity
    /// agrees, and closes those whose entity differs. A closed gold marking
    /// can no longer be matched by a lower-scored prediction.
    fn match_overlapping(&self, predicted: &[Marking], gold: &[Marking]) -> MatchCounts {
        let gold_entities: Vec<Option<EntityId>> = gold.iter().map(|g| self.resolve(g)).collect();
        let mut open = vec![true; gold.len()];
        let mut tp = 0;

        for pred in predicted.sorted_by_score() {
            let pred_span = pred.position();
            let pred_entity = self.resolve(pred);
            let mut claimed = false;

            for (i, g) in gold.iter().enumerate() {
                if !open[i] || !pred_span.overlaps(&g.position()) {
                    continue;
                }
                if pred_entity != gold_entities[i] {
                    open[i] = false;
                } else if !claimed {
                    open[i] = false;
                    claimed = true;
                    tp += 1;
                }
            }
        }

        MatchCounts::new(tp, predicted.len() - tp, gold.len() - tp)
    }

    /// Set comparison of linked entities; markings without entity are ignored.
    fn match_tags(&self, predicted: &[Marking], gold: &[Marking]) -> MatchCounts {
        let resolved = |markings: &[Marking]| {
            let mut seen: Vec<EntityId> = Vec::new();
            for entity in markings.distinct_entities() {
                let canonical = self.resolver.resolve(entity);
                if !seen.contains(&canonical) {
                    seen.push(canonical);
                }
            }
            seen
        };

        let predicted_entities = resolved(predicted);
        let gold_entities = resolved(gold);

        let tp = predicted_entities
            .iter()
            .filter(|e| gold_entities.contains(e))
            .count();

        MatchCounts::new(
            tp,
            predicted_entities.len() - tp,
            gold_entities.len() - tp,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
