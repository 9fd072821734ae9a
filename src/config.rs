//! Runner and experiment configuration.
//!
//! Both structs deserialize from TOML with every field optional:
//!
//! ```toml
//! workers = 4
//!
//! [runner]
//! window_size = 50
//! error_threshold = 0.1
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cancellation policy of a single task run.
///
/// Documents are grouped into consecutive windows of `window_size`. A run is
/// cancelled as soon as the failures in the current window exceed
/// `error_threshold` of that window's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Documents per error window.
    pub window_size: usize,
    /// Maximum tolerated failure rate per window, in [0, 1].
    pub error_threshold: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            error_threshold: 0.2,
        }
    }
}

impl RunnerConfig {
    /// Never cancel: the run always attempts every document.
    pub fn tolerant() -> Self {
        Self {
            error_threshold: 1.0,
            ..Self::default()
        }
    }

    /// With a window size.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// With an error threshold.
    #[must_use]
    pub fn with_error_threshold(mut self, error_threshold: f64) -> Self {
        self.error_threshold = error_threshold;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::config("window_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.error_threshold) {
            return Err(Error::config(format!(
                "error_threshold must be within [0, 1], got {}",
                self.error_threshold
            )));
        }
        Ok(())
    }
}

/// Configuration of an experiment (many task runs).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Per-run cancellation policy.
    pub runner: RunnerConfig,
    /// Worker threads for parallel runs (0 = rayon default).
    pub workers: usize,
}

impl EvalConfig {
    /// Sequential evaluation on a single worker.
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            ..Self::default()
        }
    }

    /// With a runner configuration.
    #[must_use]
    pub fn with_runner(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }

    /// With a worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        self.runner.validate()
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EvalConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.window_size, 100);
        assert!((config.error_threshold - 0.2).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(RunnerConfig::default().with_window_size(0).validate().is_err());
        assert!(RunnerConfig::default().with_error_threshold(1.5).validate().is_err());
        assert!(RunnerConfig::default().with_error_threshold(-0.1).validate().is_err());
        assert!(RunnerConfig::default()
            .with_error_threshold(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = EvalConfig::from_toml_str("[runner]\nwindow_size = 10\n").unwrap();
        assert_eq!(config.runner.window_size, 10);
        assert!((config.runner.error_threshold - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.workers, 0);
    }

    #[test]
    fn test_invalid_toml_value() {
        let err = EvalConfig::from_toml_str("[runner]\nerror_threshold = 2.0\n").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workers = 3").unwrap();
        let config = EvalConfig::load(file.path()).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.runner, RunnerConfig::default());
    }
}
