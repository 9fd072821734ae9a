//! Task results, run states, and result cell values.

use super::task::TaskConfiguration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a run was rejected before any document was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigFailure {
    /// The matching mode cannot score the task type.
    UnsupportedMatching,
    /// Texts and gold marking sets have different lengths.
    InconsistentDataset,
    /// The annotator or dataset name is not registered.
    UnknownComponent,
}

impl ConfigFailure {
    /// Wire-level state code.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            ConfigFailure::UnsupportedMatching => -4,
            ConfigFailure::InconsistentDataset | ConfigFailure::UnknownComponent => -5,
        }
    }
}

/// Lifecycle state of one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Created, nothing processed yet.
    NotStarted,
    /// Documents are being processed.
    Running,
    /// Every document was attempted.
    Finished,
    /// Aborted because too many documents failed.
    Cancelled,
    /// Rejected before processing.
    ConfigurationFailed(ConfigFailure),
}

impl TaskState {
    /// State code used in tables and legacy result files.
    ///
    /// Finished is `0`; everything else is negative. `-2` is never a state
    /// code, it marks a missing result.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            TaskState::Finished => 0,
            TaskState::NotStarted | TaskState::Running => -1,
            TaskState::Cancelled => -3,
            TaskState::ConfigurationFailed(failure) => failure.code(),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::NotStarted => f.write_str("not started"),
            TaskState::Running => f.write_str("running"),
            TaskState::Finished => f.write_str("finished"),
            TaskState::Cancelled => f.write_str("cancelled"),
            TaskState::ConfigurationFailed(failure) => {
                write!(f, "configuration failed ({:?})", failure)
            }
        }
    }
}

/// Outcome of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// What was evaluated.
    pub config: TaskConfiguration,
    /// `[microF1, microP, microR, macroF1, macroP, macroR]`.
    pub results: [f64; 6],
    /// Final (or current) state.
    pub state: TaskState,
    /// Documents whose annotation call failed.
    pub error_count: usize,
    /// Documents handed to the annotation system.
    pub documents_attempted: usize,
    /// When the run ended (or was created, if it never ran).
    pub timestamp: DateTime<Utc>,
    /// Failure description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskResult {
    /// Index of micro F1 in [`results`](Self::results).
    pub const MICRO_F1: usize = 0;
    /// Index of micro precision.
    pub const MICRO_PRECISION: usize = 1;
    /// Index of micro recall.
    pub const MICRO_RECALL: usize = 2;
    /// Index of macro F1.
    pub const MACRO_F1: usize = 3;
    /// Index of macro precision.
    pub const MACRO_PRECISION: usize = 4;
    /// Index of macro recall.
    pub const MACRO_RECALL: usize = 5;

    /// A fresh, not yet started result.
    #[must_use]
    pub fn new(config: TaskConfiguration) -> Self {
        Self {
            config,
            results: [0.0; 6],
            state: TaskState::NotStarted,
            error_count: 0,
            documents_attempted: 0,
            timestamp: Utc::now(),
            message: None,
        }
    }

    /// A result for a run rejected before processing.
    #[must_use]
    pub fn configuration_failed(
        config: TaskConfiguration,
        failure: ConfigFailure,
        message: impl Into<String>,
    ) -> Self {
        Self {
            state: TaskState::ConfigurationFailed(failure),
            message: Some(message.into()),
            ..Self::new(config)
        }
    }

    /// Micro F1.
    pub fn micro_f1(&self) -> f64 {
        self.results[Self::MICRO_F1]
    }

    /// Micro precision.
    pub fn micro_precision(&self) -> f64 {
        self.results[Self::MICRO_PRECISION]
    }

    /// Micro recall.
    pub fn micro_recall(&self) -> f64 {
        self.results[Self::MICRO_RECALL]
    }

    /// Macro F1.
    pub fn macro_f1(&self) -> f64 {
        self.results[Self::MACRO_F1]
    }

    /// Macro precision.
    pub fn macro_precision(&self) -> f64 {
        self.results[Self::MACRO_PRECISION]
    }

    /// Macro recall.
    pub fn macro_recall(&self) -> f64 {
        self.results[Self::MACRO_RECALL]
    }

    /// Wire-level state code.
    pub fn state_code(&self) -> i32 {
        self.state.code()
    }

    /// Whether every document was attempted.
    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }
}

/// Sentinel for a missing result at the numeric boundary.
pub const NOT_AVAILABLE_CODE: i32 = -2;

/// One cell of a result or correlation table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ResultValue {
    /// A computed value.
    Success(f64),
    /// No value exists (no run, or too few samples).
    NotAvailable,
    /// The run ended in a non-finished state with this code.
    Error(i32),
}

impl ResultValue {
    /// Encode as a single number: the value itself, `-2` for missing, or the
    /// (negative) error code.
    #[must_use]
    pub fn to_sentinel(&self) -> f64 {
        match self {
            ResultValue::Success(x) => *x,
            ResultValue::NotAvailable => f64::from(NOT_AVAILABLE_CODE),
            ResultValue::Error(code) => f64::from(*code),
        }
    }

    /// Decode the single-number encoding.
    #[must_use]
    pub fn from_sentinel(value: f64) -> Self {
        if value >= 0.0 || value.is_nan() {
            ResultValue::Success(value)
        } else if value == f64::from(NOT_AVAILABLE_CODE) {
            ResultValue::NotAvailable
        } else {
            ResultValue::Error(value as i32)
        }
    }

    /// The value, if this cell holds one.
    pub fn value(&self) -> Option<f64> {
        match self {
            ResultValue::Success(x) => Some(*x),
            _ => None,
        }
    }

    /// Table cell text: three decimals, `n.a.`, or `error (<code>)`.
    #[must_use]
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Success(x) => write!(f, "{:.3}", x),
            ResultValue::NotAvailable => f.write_str("n.a."),
            ResultValue::Error(code) => write!(f, "error ({})", code),
        }
    }
}

impl From<&TaskResult> for ResultValue {
    /// Micro F1 of a finished run, the state code otherwise.
    fn from(result: &TaskResult) -> Self {
        if result.is_finished() {
            ResultValue::Success(result.micro_f1())
        } else {
            ResultValue::Error(result.state_code())
        }
    }
}
