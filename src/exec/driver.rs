// src/exec/driver.rs

//! The coordinating executor loop.
//!
//! One loop owns the registry. Each iteration dispatches every schedulable
//! task to a spawned worker, then blocks on the workers' completion channel
//! until the next task resolves. There is no polling interval: progress is
//! driven entirely by completion messages.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::{ExecutionSummary, TaskId, TaskRegistry, TaskResult, TaskStatus};
use crate::errors::{QuerydagError, Result};
use crate::exec::backend::AnswerBackend;
use crate::exec::{TaskOutcome, WorkerEvent};

/// Outcome of one full DAG run.
#[derive(Debug)]
pub struct DagRun {
    /// One result per terminal task, keyed and ordered by task id.
    pub results: BTreeMap<TaskId, TaskResult>,
    pub summary: ExecutionSummary,
}

/// Drives a submitted [`TaskRegistry`] to completion against an
/// [`AnswerBackend`].
///
/// The registry enforces the concurrency bound (it never hands out more
/// tasks than there are free slots), so the driver's only jobs are
/// dispatch, collection, and failure cascading.
pub struct DagExecutor<B> {
    registry: TaskRegistry,
    backend: Arc<B>,
    task_timeout: Option<Duration>,
}

impl<B: AnswerBackend + 'static> DagExecutor<B> {
    pub fn new(registry: TaskRegistry, backend: Arc<B>, task_timeout: Option<Duration>) -> Self {
        Self {
            registry,
            backend,
            task_timeout,
        }
    }

    /// Run the DAG until every task is terminal.
    ///
    /// A single task failure is never fatal: it fails that task and its
    /// transitive dependents, and the run continues. The only run-level
    /// error is a stall (no task running, none schedulable, run
    /// incomplete), which submission-time cycle validation makes a
    /// scheduler-bug indicator rather than an expected input case.
    pub async fn run(mut self) -> Result<DagRun> {
        info!(
            tasks = self.registry.len(),
            timeout = ?self.task_timeout,
            "starting DAG execution"
        );
        let run_started = Instant::now();

        let (event_tx, mut event_rx) = mpsc::channel::<WorkerEvent>(32);

        loop {
            for task_id in self.registry.schedulable_tasks() {
                self.dispatch(task_id, &event_tx);
            }

            if self.registry.is_complete() {
                break;
            }

            if self.registry.running_count() == 0 {
                let summary = self.registry.summary();
                error!(
                    pending = summary.pending,
                    completed = summary.completed,
                    failed = summary.failed,
                    "no task is running or schedulable but execution is incomplete"
                );
                return Err(QuerydagError::Stalled(format!(
                    "{} of {} tasks can never run",
                    summary.pending, summary.total
                )));
            }

            // At least one worker is in flight and every worker posts
            // exactly one event, so this always makes progress.
            let Some(WorkerEvent::TaskFinished { task_id, outcome }) = event_rx.recv().await
            else {
                break;
            };
            self.settle(task_id, outcome);
        }

        let summary = self.registry.summary();
        info!(
            elapsed = run_started.elapsed().as_secs_f64(),
            completed = summary.completed,
            failed = summary.failed,
            "DAG execution finished"
        );

        Ok(DagRun {
            results: self.registry.collect_results(),
            summary,
        })
    }

    /// Hand one task to a worker, marking it started at launch.
    fn dispatch(&mut self, task_id: TaskId, event_tx: &mpsc::Sender<WorkerEvent>) {
        let Some(question) = self.registry.question(task_id).map(str::to_string) else {
            return;
        };
        let context = self.registry.upstream_context(task_id);
        self.registry.start_task(task_id);

        let backend = Arc::clone(&self.backend);
        let timeout = self.task_timeout;
        let tx = event_tx.clone();

        tokio::spawn(async move {
            let outcome = invoke_backend(backend, question, context, timeout).await;
            // The receiver outlives every worker; a send failure only means
            // the run was torn down early.
            let _ = tx.send(WorkerEvent::TaskFinished { task_id, outcome }).await;
        });
    }

    /// Apply one worker outcome to the registry, cascading failures.
    fn settle(&mut self, task_id: TaskId, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Answered { answer, elapsed } => {
                let question = self
                    .registry
                    .question(task_id)
                    .map(str::to_string)
                    .unwrap_or_default();
                self.registry.complete_task(
                    task_id,
                    TaskResult {
                        task_id,
                        question,
                        answer,
                        status: TaskStatus::Completed,
                        execution_time: elapsed,
                        error: None,
                    },
                );
            }
            TaskOutcome::Errored { error, elapsed } => {
                debug!(task_id, elapsed, "worker reported failure");
                self.registry.fail_task(task_id, error);
                for dependent in self.registry.dependents(task_id) {
                    self.registry
                        .fail_task(dependent, format!("Dependency task {task_id} failed"));
                }
            }
        }
    }
}

/// Invoke the backend once, bounding it with the configured timeout and
/// capturing panics as ordinary failures.
///
/// The callback runs inside its own spawned task so that a panicking
/// backend surfaces as a `JoinError` here instead of killing the worker
/// without a completion message. Shared by the pool workers and the
/// single-task fast path.
pub(crate) async fn invoke_backend<B: AnswerBackend + 'static>(
    backend: Arc<B>,
    question: String,
    context: Option<String>,
    timeout: Option<Duration>,
) -> TaskOutcome {
    let started = Instant::now();

    let mut call = tokio::spawn(async move {
        backend.answer(&question, context.as_deref()).await
    });

    let resolved = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut call).await {
            Ok(joined) => joined,
            Err(_) => {
                call.abort();
                return TaskOutcome::Errored {
                    error: format!("task timed out after {}s", limit.as_secs()),
                    elapsed: started.elapsed().as_secs_f64(),
                };
            }
        },
        None => call.await,
    };

    let elapsed = started.elapsed().as_secs_f64();
    match resolved {
        Ok(Ok(answer)) => TaskOutcome::Answered { answer, elapsed },
        Ok(Err(err)) => TaskOutcome::Errored {
            error: err.to_string(),
            elapsed,
        },
        Err(join_err) => TaskOutcome::Errored {
            error: format!("answering task aborted: {join_err}"),
            elapsed,
        },
    }
}
