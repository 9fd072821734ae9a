//! Extension traits for marking collections.

use crate::{EntityId, Marking, Span};
use std::cmp::Ordering;

/// Extension methods for slices of markings.
///
/// Adds the reductions between output shapes (ranked, annotations at
/// given mentions, spans only, linked entities) to `[Marking]` and
/// `Vec<Marking>` without a newtype.
///
/// # Example
///
/// ```rust
/// use kbeval::{Marking, Span};
/// use kbeval::types::MarkingSliceExt;
///
/// let output = vec![
///     Marking::scored(0, 5, "Paris", 0.4),
///     Marking::scored(10, 6, "Berlin", 0.9),
/// ];
///
/// let ranked = output.sorted_by_score();
/// assert_eq!(ranked[0].entity().map(|e| e.as_str()), Some("Berlin"));
///
/// let kept = output.at_mentions(&[Span::new(0, 5)]);
/// assert_eq!(kept.len(), 1);
/// ```
pub trait MarkingSliceExt {
    /// Markings ordered by descending confidence.
    ///
    /// Scored markings come first; unscored markings follow. Equal scores and
    /// unscored markings keep their input order.
    fn sorted_by_score(&self) -> Vec<&Marking>;

    /// Keep only markings whose span equals one of the given mentions.
    fn at_mentions(&self, mentions: &[Span]) -> Vec<Marking>;

    /// The spans of all markings, in order.
    fn spans(&self) -> Vec<Span>;

    /// Distinct linked entities in first-seen order.
    fn distinct_entities(&self) -> Vec<&EntityId>;
}

impl MarkingSliceExt for [Marking] {
    fn sorted_by_score(&self) -> Vec<&Marking> {
        let mut sorted: Vec<&Marking> = self.iter().collect();
        // Stable sort keeps input order among ties.
        sorted.sort_by(|a, b| match (a.score(), b.score()) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        sorted
    }

    fn at_mentions(&self, mentions: &[Span]) -> Vec<Marking> {
        self.iter()
            .filter(|m| mentions.contains(&m.position()))
            .cloned()
            .collect()
    }

    fn spans(&self) -> Vec<Span> {
        self.iter().map(Marking::position).collect()
    }

    fn distinct_entities(&self) -> Vec<&EntityId> {
        let mut seen: Vec<&EntityId> = Vec::new();
        for entity in self.iter().filter_map(Marking::entity) {
            if !seen.contains(&entity) {
                seen.push(entity);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_score_puts_unscored_last() {
        let markings = vec![
            Marking::annotation(0, 1, "a"),
            Marking::scored(2, 1, "b", 0.3),
            Marking::annotation(4, 1, "c"),
            Marking::scored(6, 1, "d", 0.9),
            Marking::scored(8, 1, "e", 0.3),
        ];
        let order: Vec<&str> = markings
            .sorted_by_score()
            .iter()
            .filter_map(|m| m.entity().map(EntityId::as_str))
            .collect();
        assert_eq!(order, vec!["d", "b", "e", "a", "c"]);
    }

    #[test]
    fn test_distinct_entities() {
        let markings = vec![
            Marking::annotation(0, 1, "Paris"),
            Marking::span(3, 2),
            Marking::annotation(9, 5, "Paris"),
            Marking::annotation(20, 4, "Rome"),
        ];
        let ids: Vec<&str> = markings
            .distinct_entities()
            .into_iter()
            .map(EntityId::as_str)
            .collect();
        assert_eq!(ids, vec!["Paris", "Rome"]);
    }
}
