// src/exec/mod.rs

//! Execution layer.
//!
//! This module drives the registry to completion against an opaque
//! answering backend.
//!
//! - [`backend`] defines the [`AnswerBackend`] callback boundary plus small
//!   adapters (`FnBackend` for synchronous closures, `EchoBackend` for plan
//!   simulation).
//! - [`driver`] owns the coordinating loop: it dispatches schedulable tasks
//!   to spawned workers and blocks on their completion channel.

pub mod backend;
pub mod driver;

use crate::dag::TaskId;

pub use backend::{AnswerBackend, EchoBackend, FnBackend};
pub use driver::{DagExecutor, DagRun};

/// Terminal outcome of one backend invocation, as reported by a worker.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Answered { answer: String, elapsed: f64 },
    Errored { error: String, elapsed: f64 },
}

/// Message a worker posts to the coordinating loop when its task resolves.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    TaskFinished { task_id: TaskId, outcome: TaskOutcome },
}
