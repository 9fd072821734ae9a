//! Evaluation of annotation systems against gold-standard datasets.
//!
//! # Pipeline
//!
//! ```text
//! Dataset + AnnotationSystem
//!         │
//!         ▼
//!    TaskRunner ──(per document)──► MatchingEngine ──► MetricsAggregator
//!         │                                                   │
//!         ▼                                                   ▼
//!    TaskResult ◄───────────── [microF1, microP, microR, macroF1, macroP, macroR]
//!         │
//!         ▼
//!    ResultStore ──► ResultsMatrix + DatasetMetaData ──► CorrelationAnalyzer
//!                                    │
//!                                    ▼
//!                          Overview (two tables)
//! ```
//!
//! # Task types and matching
//!
//! | Matching | Valid for |
//! |----------|-----------|
//! | `WeakAnnotation` | A2KB, Sa2KB |
//! | `StrongAnnotation` | D2KB, A2KB, Sa2KB |
//! | `StrongEntity` | C2KB, Rc2KB, Sc2KB |
//!
//! Any other combination is a configuration failure (state code `-4`).
//!
//! # Quick Start
//!
//! ```rust
//! use kbeval::eval::{MatchingMode, TaskConfiguration, TaskRunner, TaskType};
//! use kbeval::{Document, InMemoryDataset, Marking, MockSystem};
//!
//! let gold = InMemoryDataset::new("demo", vec![
//!     Document::new("Obama visited Berlin", vec![
//!         Marking::annotation(0, 5, "Barack_Obama"),
//!         Marking::annotation(14, 6, "Berlin"),
//!     ]),
//! ]);
//! let system = MockSystem::new("half").with_markings(vec![
//!     Marking::annotation(14, 6, "Berlin"),
//! ]);
//!
//! let task = TaskConfiguration::new("half", "demo", TaskType::A2KB, MatchingMode::WeakAnnotation);
//! let result = TaskRunner::default().run(&task, &system, &gold);
//!
//! assert_eq!(result.micro_precision(), 1.0);
//! assert_eq!(result.micro_recall(), 0.5);
//! ```

pub mod correlation;
pub mod experiment;
pub mod matching;
pub mod metrics;
pub mod overview;
pub mod result;
pub mod runner;
pub mod store;
pub mod table;
pub mod task;

pub use correlation::{CorrelationAnalyzer, CorrelationMatrix, ResultsMatrix};
pub use experiment::{DatasetRegistry, ExperimentRunner, SystemRegistry};
pub use matching::{
    select_strategy, EntityResolver, IdentityResolver, MapResolver, MatchCounts, MatchRelation,
    MatchStrategy, MatchingEngine, UnsupportedMatching,
};
pub use metrics::{Measures, MetricsAggregator, PrfScores};
pub use overview::Overview;
pub use result::{ConfigFailure, ResultValue, TaskResult, TaskState};
pub use runner::{ErrorWindow, TaskRunner};
pub use store::{InMemoryMetadata, InMemoryResultStore, MetadataProvider, ResultStore, TaskId};
pub use table::Table;
pub use task::{MatchingMode, TaskConfiguration, TaskType};
