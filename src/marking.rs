//! Markings: spans of text, optionally linked to a knowledge-base entity.

use serde::{Deserialize, Serialize};

/// A character span inside a document.
///
/// `start` and `length` are unsigned, so a span can never start before the
/// document or have negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (characters).
    pub start: usize,
    /// Length (characters).
    pub length: usize,
}

impl Span {
    /// Create a span from start offset and length.
    #[must_use]
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Exclusive end offset.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Check if two spans share at least one character.
    ///
    /// Two empty spans at the same offset are treated as overlapping.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        if self == other {
            return true;
        }
        self.start < other.end() && other.start < self.end()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Knowledge-base identifier of an entity (e.g. a Wikipedia title or URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A marking produced by an annotation system or stored as gold standard.
///
/// Serialized as a flat JSON object; the variant is inferred from the
/// fields present:
///
/// ```text
/// {"start": 0, "length": 4}                                   -> Span
/// {"start": 0, "length": 4, "entity": "Paris"}                -> Annotation
/// {"start": 0, "length": 4, "entity": "Paris", "score": 0.8}  -> Scored
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Marking {
    /// Span with an entity and a confidence score.
    Scored {
        /// Start offset.
        start: usize,
        /// Length.
        length: usize,
        /// Linked entity.
        entity: EntityId,
        /// Confidence (0.0-1.0).
        score: f64,
    },
    /// Span with an entity.
    Annotation {
        /// Start offset.
        start: usize,
        /// Length.
        length: usize,
        /// Linked entity.
        entity: EntityId,
    },
    /// Plain mention span.
    Span {
        /// Start offset.
        start: usize,
        /// Length.
        length: usize,
    },
}

impl Marking {
    /// Create a plain span marking.
    #[must_use]
    pub fn span(start: usize, length: usize) -> Self {
        Marking::Span { start, length }
    }

    /// Create a span linked to an entity.
    #[must_use]
    pub fn annotation(start: usize, length: usize, entity: impl Into<EntityId>) -> Self {
        Marking::Annotation {
            start,
            length,
            entity: entity.into(),
        }
    }

    /// Create a scored annotation. The score is clamped to [0.0, 1.0];
    /// NaN becomes 0.0.
    #[must_use]
    pub fn scored(start: usize, length: usize, entity: impl Into<EntityId>, score: f64) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Marking::Scored {
            start,
            length,
            entity: entity.into(),
            score,
        }
    }

    /// The marked span.
    #[must_use]
    pub fn position(&self) -> Span {
        match *self {
            Marking::Scored { start, length, .. }
            | Marking::Annotation { start, length, .. }
            | Marking::Span { start, length } => Span::new(start, length),
        }
    }

    /// The linked entity, if any.
    #[must_use]
    pub fn entity(&self) -> Option<&EntityId> {
        match self {
            Marking::Scored { entity, .. } | Marking::Annotation { entity, .. } => Some(entity),
            Marking::Span { .. } => None,
        }
    }

    /// The confidence score, if any.
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        match self {
            Marking::Scored { score, .. } => Some(*score),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 8);
        assert!(a.overlaps(&Span::new(4, 10)));
        assert!(!a.overlaps(&Span::new(8, 3)));
        assert!(Span::new(5, 0).overlaps(&Span::new(5, 0)));
        assert!(!Span::new(5, 0).overlaps(&Span::new(6, 0)));
    }

    #[test]
    fn test_scored_clamps() {
        assert_eq!(Marking::scored(0, 1, "x", 1.7).score(), Some(1.0));
        assert_eq!(Marking::scored(0, 1, "x", f64::NAN).score(), Some(0.0));
    }

    #[test]
    fn test_json_variant_inference() {
        let parsed: Vec<Marking> = serde_json::from_str(
            r#"[
                {"start": 0, "length": 4},
                {"start": 0, "length": 4, "entity": "Paris"},
                {"start": 0, "length": 4, "entity": "Paris", "score": 0.5}
            ]"#,
        )
        .unwrap();
        assert_eq!(parsed[0], Marking::span(0, 4));
        assert_eq!(parsed[1], Marking::annotation(0, 4, "Paris"));
        assert_eq!(parsed[2], Marking::scored(0, 4, "Paris", 0.5));
    }
}
