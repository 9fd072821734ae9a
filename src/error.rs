//! Error types for kbeval.

use thiserror::Error;

/// Result type for kbeval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for kbeval operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The annotation system could not produce markings for a document.
    #[error("Annotation failed: {0}")]
    Annotation(String),

    /// The matching mode cannot score the task type.
    #[error("Matching {matching} is not supported for task type {task}")]
    UnsupportedMatching {
        /// Requested matching mode.
        matching: String,
        /// Requested task type.
        task: String,
    },

    /// Document texts and gold marking sets do not both match the dataset size.
    #[error(
        "Dataset {dataset} is inconsistent: {size} documents, {texts} texts, {gold} gold marking sets"
    )]
    DatasetMismatch {
        /// Dataset name.
        dataset: String,
        /// Declared number of documents.
        size: usize,
        /// Number of document texts.
        texts: usize,
        /// Number of gold marking sets.
        gold: usize,
    },

    /// An annotator or dataset name has no registered implementation.
    #[error("Unknown {kind}: {name}")]
    UnknownComponent {
        /// "annotator" or "dataset".
        kind: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create an annotation error.
    pub fn annotation(msg: impl Into<String>) -> Self {
        Error::Annotation(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an unknown annotator error.
    pub fn unknown_annotator(name: impl Into<String>) -> Self {
        Error::UnknownComponent {
            kind: "annotator",
            name: name.into(),
        }
    }

    /// Create an unknown dataset error.
    pub fn unknown_dataset(name: impl Into<String>) -> Self {
        Error::UnknownComponent {
            kind: "dataset",
            name: name.into(),
        }
    }

    /// Whether this error describes a malformed experiment rather than a
    /// failing system under test.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedMatching { .. }
                | Error::DatasetMismatch { .. }
                | Error::UnknownComponent { .. }
                | Error::Config(_)
        )
    }
}
