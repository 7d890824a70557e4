// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::errors::{QuerydagError, Result};

/// Scheduler runtime options.
///
/// All fields have defaults, so an empty TOML file (or no file at all) is a
/// valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Upper bound on simultaneously running tasks.
    pub max_concurrent_tasks: usize,

    /// Per-task wall-clock limit in seconds. A task that exceeds it is
    /// failed (and its dependents cascade) instead of stalling the run.
    /// `None` disables the limit; the answering backend is still expected
    /// to bound its own slow operations.
    pub task_timeout_secs: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 10,
            task_timeout_secs: None,
        }
    }
}

impl SchedulerConfig {
    /// The configured per-task timeout as a [`Duration`], if any.
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }

    /// Basic sanity checks, run after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_tasks == 0 {
            return Err(QuerydagError::ConfigError(
                "max_concurrent_tasks must be >= 1 (got 0)".to_string(),
            ));
        }
        if self.task_timeout_secs == Some(0) {
            return Err(QuerydagError::ConfigError(
                "task_timeout_secs must be >= 1 when set (got 0)".to_string(),
            ));
        }
        Ok(())
    }
}
