//! # kbeval
//!
//! Benchmark evaluation of entity annotation and linking systems.
//!
//! - **Runner**: drives a system over a gold dataset, tolerating failures
//!   up to a per-window error rate
//! - **Matching**: weak/strong annotation and entity-set matching, selected
//!   per task type (D2KB, A2KB, Sa2KB, C2KB, Sc2KB, Rc2KB)
//! - **Metrics**: micro and macro precision/recall/F1
//! - **Correlation**: Spearman correlation of scores with dataset properties
//!
//! ## Quick Start
//!
//! ```rust
//! use kbeval::prelude::*;
//!
//! let gold = InMemoryDataset::new("demo", vec![
//!     Document::new("Paris and Rome", vec![
//!         Marking::annotation(0, 5, "Paris"),
//!         Marking::annotation(10, 4, "Rome"),
//!     ]),
//! ]);
//! let system = MockSystem::new("mock").with_markings(vec![
//!     Marking::annotation(0, 5, "Paris"),
//!     Marking::annotation(10, 4, "Milan"),
//! ]);
//!
//! let task = TaskConfiguration::new("mock", "demo", TaskType::A2KB, MatchingMode::StrongAnnotation);
//! let result = TaskRunner::default().run(&task, &system, &gold);
//!
//! assert_eq!(result.state, TaskState::Finished);
//! assert_eq!(result.micro_f1(), 0.5);
//! ```
//!
//! ## Plugging in a system
//!
//! Implement [`AnnotationSystem`] for an adapter to an annotation service.
//! Only `annotate` is required; `disambiguate` (used for D2KB) defaults to
//! annotating and keeping the markings at the given mentions.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `cli` | yes | `kbeval` binary (clap, env_logger) |
//! | `fast-lock` | no | `parking_lot` mutex in the in-memory store |

#![warn(missing_docs)]

pub mod config;
pub mod dataset;
mod error;
pub mod eval;
mod marking;
pub mod sync;
pub mod system;
pub mod types;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use kbeval::prelude::*;
    //!
    //! let strategy = select_strategy(MatchingMode::StrongEntity, TaskType::C2KB).unwrap();
    //! let counts = MatchingEngine::default().score(
    //!     &[Marking::annotation(3, 4, "Rome")],
    //!     &[Marking::annotation(0, 4, "Rome")],
    //!     &strategy,
    //! );
    //! assert_eq!(counts.true_positives, 1);
    //! ```
    pub use crate::config::{EvalConfig, RunnerConfig};
    pub use crate::dataset::{Dataset, DatasetMetaData, Document, InMemoryDataset};
    pub use crate::error::{Error, Result};
    pub use crate::eval::{
        select_strategy, MatchCounts, MatchingEngine, MatchingMode, ResultValue,
        TaskConfiguration, TaskResult, TaskRunner, TaskState, TaskType,
    };
    pub use crate::marking::{EntityId, Marking, Span};
    pub use crate::system::{AnnotationSystem, MockSystem, RecordedSystem};
    pub use crate::types::MarkingSliceExt;
}

// Re-exports
pub use config::{EvalConfig, RunnerConfig};
pub use dataset::{
    Dataset, DatasetMetaData, Document, DocumentFile, InMemoryDataset, MetadataDimension,
};
pub use error::{Error, Result};
pub use marking::{EntityId, Marking, Span};
pub use system::{AnnotationSystem, MockSystem, RecordedSystem};
