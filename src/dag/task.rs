// src/dag/task.rs

//! Task metadata and result records.

use std::time::Instant;

use serde::Serialize;

use crate::dag::TaskId;

/// Lifecycle state of a task within one DAG run.
///
/// Transitions are monotonic: once a task reaches `Completed` or `Failed`
/// it never leaves that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting on dependencies (or on a free execution slot).
    Pending,
    /// All dependencies completed; eligible for dispatch.
    Ready,
    /// Dispatched to the answering backend.
    Running,
    /// Finished with an answer.
    Completed,
    /// Finished with an error, or blocked by a failed dependency.
    Failed,
}

impl TaskStatus {
    /// Whether the task has reached a final state.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Immutable record produced when a task finishes.
///
/// Successful tasks carry their answer; failed tasks carry an empty answer
/// and the recorded error.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub question: String,
    pub answer: String,
    pub status: TaskStatus,
    /// Elapsed wall-clock seconds between dispatch and completion.
    pub execution_time: f64,
    pub error: Option<String>,
}

/// Aggregate run counters, suitable for structured logging or monitoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub running: usize,
    pub pending: usize,
    pub completion_rate: f64,
}

/// Registry-internal per-task state.
#[derive(Debug, Clone)]
pub(crate) struct TaskNode {
    pub question: String,
    pub status: TaskStatus,
    /// Populated only on `Completed`.
    pub result: Option<TaskResult>,
    /// Populated only on `Failed`.
    pub error: Option<String>,
    /// Set when the task transitions to `Running`.
    pub started_at: Option<Instant>,
    /// Elapsed seconds at the moment of failure, for tasks that had started.
    pub failed_after: Option<f64>,
}

impl TaskNode {
    pub(crate) fn new(question: String) -> Self {
        Self {
            question,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            started_at: None,
            failed_after: None,
        }
    }
}
