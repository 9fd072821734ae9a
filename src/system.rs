//! The annotation-system capability evaluated by the task runner.
//!
//! Adapters to concrete annotation services live outside this crate; they
//! only need to implement [`AnnotationSystem`]. Two implementations ship
//! here: [`MockSystem`] for tests and [`RecordedSystem`], which replays
//! output captured earlier (e.g. from a JSON file).

use crate::dataset::DocumentFile;
use crate::types::MarkingSliceExt;
use crate::{Error, Marking, Result, Span};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A system under test: turns document text into markings.
///
/// Implementations must be shareable across worker threads. A failed call
/// returns [`Error::Annotation`]; the runner counts it and moves on.
pub trait AnnotationSystem: Send + Sync {
    /// Display name of the system.
    fn name(&self) -> &str;

    /// Detect and link entities in `text`.
    fn annotate(&self, text: &str) -> Result<Vec<Marking>>;

    /// Link the given mentions of `text`.
    ///
    /// The default runs [`annotate`](Self::annotate) and keeps only markings
    /// whose span equals one of the mentions.
    fn disambiguate(&self, text: &str, mentions: &[Span]) -> Result<Vec<Marking>> {
        Ok(self.annotate(text)?.at_mentions(mentions))
    }
}

impl<T: AnnotationSystem + ?Sized> AnnotationSystem for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn annotate(&self, text: &str) -> Result<Vec<Marking>> {
        (**self).annotate(text)
    }

    fn disambiguate(&self, text: &str, mentions: &[Span]) -> Result<Vec<Marking>> {
        (**self).disambiguate(text, mentions)
    }
}

/// A mock annotation system for testing.
///
/// Returns the same markings for every document. Optionally fails the first
/// `n` calls of every block of one hundred calls.
///
/// # Example
///
/// ```rust
/// use kbeval::{AnnotationSystem, Marking, MockSystem};
///
/// let mock = MockSystem::new("mock")
///     .with_markings(vec![Marking::annotation(0, 5, "Paris")])
///     .with_failures_per_hundred(1);
///
/// assert!(mock.annotate("Paris is nice").is_err());
/// assert_eq!(mock.annotate("Paris is nice").unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockSystem {
    name: String,
    markings: Vec<Marking>,
    failures_per_hundred: usize,
    calls: AtomicUsize,
}

impl MockSystem {
    /// Create a mock that returns no markings and never fails.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markings: Vec::new(),
            failures_per_hundred: 0,
            calls: AtomicUsize::new(0),
        }
    }

    /// Set markings to return on every call.
    #[must_use]
    pub fn with_markings(mut self, markings: Vec<Marking>) -> Self {
        self.markings = markings;
        self
    }

    /// Fail the first `n` calls of every hundred (clamped to 100).
    #[must_use]
    pub fn with_failures_per_hundred(mut self, n: usize) -> Self {
        self.failures_per_hundred = n.min(100);
        self
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AnnotationSystem for MockSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotate(&self, _text: &str) -> Result<Vec<Marking>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call % 100 < self.failures_per_hundred {
            return Err(Error::annotation(format!(
                "{}: injected failure on call {}",
                self.name,
                call + 1
            )));
        }
        Ok(self.markings.clone())
    }
}

/// Replays previously captured output, keyed by document text.
///
/// A document whose text was never recorded fails like an unreachable
/// service would.
#[derive(Debug, Clone, Default)]
pub struct RecordedSystem {
    name: String,
    outputs: HashMap<String, Vec<Marking>>,
}

impl RecordedSystem {
    /// Create an empty recording.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outputs: HashMap::new(),
        }
    }

    /// Record the output for one document text.
    pub fn record(&mut self, text: impl Into<String>, markings: Vec<Marking>) {
        self.outputs.insert(text.into(), markings);
    }

    /// Number of recorded documents.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Build from a parsed document file.
    #[must_use]
    pub fn from_file(file: DocumentFile) -> Self {
        let mut system = Self::new(file.name);
        for doc in file.documents {
            system.record(doc.text, doc.markings);
        }
        system
    }

    /// Load a recording from a JSON document file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_file(DocumentFile::load(path)?))
    }
}

impl AnnotationSystem for RecordedSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotate(&self, text: &str) -> Result<Vec<Marking>> {
        self.outputs.get(text).cloned().ok_or_else(|| {
            Error::annotation(format!("{}: no recorded output for document", self.name))
        })
    }
}
