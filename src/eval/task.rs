//! Task types, matching modes, and task configurations.
//!
//! Task types form a containment hierarchy: a task that asks for more
//! (e.g. scored annotations) contains the simpler tasks its output can be
//! reduced to (plain annotations, entity tags).
//!
//! ```text
//!            Sa2KB
//!           /     \
//!        A2KB     Sc2KB
//!        /  \       |
//!     D2KB   \    Rc2KB
//!             \     |
//!              C2KB
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Annotation problem being benchmarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskType {
    /// Disambiguate given mentions to KB entities.
    D2KB,
    /// Find mentions and link them to KB entities.
    A2KB,
    /// Scored A2KB: annotations carry confidences.
    Sa2KB,
    /// Concepts to KB: the set of entities mentioned, position ignored.
    C2KB,
    /// Scored C2KB.
    Sc2KB,
    /// Ranked C2KB.
    Rc2KB,
}

impl TaskType {
    /// All task types.
    pub fn all() -> &'static [TaskType] {
        &[
            TaskType::D2KB,
            TaskType::A2KB,
            TaskType::Sa2KB,
            TaskType::C2KB,
            TaskType::Sc2KB,
            TaskType::Rc2KB,
        ]
    }

    /// Task types this one contains (reflexive).
    #[must_use]
    pub fn contained(&self) -> &'static [TaskType] {
        use TaskType::*;
        match self {
            Sa2KB => &[Sa2KB, A2KB, D2KB, Sc2KB, Rc2KB, C2KB],
            A2KB => &[A2KB, D2KB, C2KB],
            D2KB => &[D2KB],
            Sc2KB => &[Sc2KB, Rc2KB, C2KB],
            Rc2KB => &[Rc2KB, C2KB],
            C2KB => &[C2KB],
        }
    }

    /// Whether this task type equals or contains `other`.
    #[must_use]
    pub fn contains(&self, other: TaskType) -> bool {
        self.contained().contains(&other)
    }

    /// Whether the system is handed the gold mentions instead of finding them.
    #[must_use]
    pub fn uses_given_mentions(&self) -> bool {
        matches!(self, TaskType::D2KB)
    }

    /// Short code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            TaskType::D2KB => "D2KB",
            TaskType::A2KB => "A2KB",
            TaskType::Sa2KB => "Sa2KB",
            TaskType::C2KB => "C2KB",
            TaskType::Sc2KB => "Sc2KB",
            TaskType::Rc2KB => "Rc2KB",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TaskType::all()
            .iter()
            .find(|t| t.code().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| Error::invalid_input(format!("unknown task type '{}'", s)))
    }
}

/// Scoring semantics applied when comparing system output to gold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchingMode {
    /// Overlapping spans with the same entity.
    WeakAnnotation,
    /// Identical spans with the same entity.
    StrongAnnotation,
    /// Same entity, position ignored.
    StrongEntity,
}

impl MatchingMode {
    /// All matching modes.
    pub fn all() -> &'static [MatchingMode] {
        &[
            MatchingMode::WeakAnnotation,
            MatchingMode::StrongAnnotation,
            MatchingMode::StrongEntity,
        ]
    }

    /// Short code (kebab case).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            MatchingMode::WeakAnnotation => "weak-annotation",
            MatchingMode::StrongAnnotation => "strong-annotation",
            MatchingMode::StrongEntity => "strong-entity",
        }
    }
}

impl fmt::Display for MatchingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MatchingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        let normalized = normalized.trim_end_matches("-match");
        MatchingMode::all()
            .iter()
            .find(|m| m.code() == normalized)
            .copied()
            .ok_or_else(|| Error::invalid_input(format!("unknown matching mode '{}'", s)))
    }
}

/// One evaluation run: which system, on which dataset, scored how.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskConfiguration {
    /// Annotator (system under test) name.
    pub annotator: String,
    /// Dataset name.
    pub dataset: String,
    /// Task type.
    pub task: TaskType,
    /// Matching mode.
    pub matching: MatchingMode,
}

impl TaskConfiguration {
    /// Create a configuration.
    #[must_use]
    pub fn new(
        annotator: impl Into<String>,
        dataset: impl Into<String>,
        task: TaskType,
        matching: MatchingMode,
    ) -> Self {
        Self {
            annotator: annotator.into(),
            dataset: dataset.into(),
            task,
            matching,
        }
    }
}

impl fmt::Display for TaskConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} ({}, {})",
            self.annotator, self.dataset, self.task, self.matching
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment_is_reflexive() {
        for t in TaskType::all() {
            assert!(t.contains(*t), "{} should contain itself", t);
        }
    }

    #[test]
    fn test_containment_is_transitive() {
        for a in TaskType::all() {
            for b in a.contained() {
                for c in b.contained() {
                    assert!(a.contains(*c), "{} ⊇ {} ⊇ {} but not {} ⊇ {}", a, b, c, a, c);
                }
            }
        }
    }

    #[test]
    fn test_scored_annotation_contains_everything() {
        assert!(TaskType::all().iter().all(|t| TaskType::Sa2KB.contains(*t)));
        assert!(!TaskType::D2KB.contains(TaskType::A2KB));
        assert!(!TaskType::C2KB.contains(TaskType::Rc2KB));
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!("a2kb".parse::<TaskType>().unwrap(), TaskType::A2KB);
        assert_eq!("Sc2KB".parse::<TaskType>().unwrap(), TaskType::Sc2KB);
        assert!("X2KB".parse::<TaskType>().is_err());

        assert_eq!(
            "weak-annotation".parse::<MatchingMode>().unwrap(),
            MatchingMode::WeakAnnotation
        );
        assert_eq!(
            "STRONG_ENTITY_MATCH".parse::<MatchingMode>().unwrap(),
            MatchingMode::StrongEntity
        );
        assert!("fuzzy".parse::<MatchingMode>().is_err());
    }
}
