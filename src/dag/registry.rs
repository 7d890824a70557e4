// src/dag/registry.rs

//! The task registry: single source of truth for one DAG run.
//!
//! The registry is a single-owner service. The executor's coordinating loop
//! owns it exclusively; workers report back over a channel and never touch
//! registry state themselves, so no operation is ever partially visible.
//! One registry instance serves one DAG run at a time: `submit` fully
//! discards the previous run's state.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task::{ExecutionSummary, TaskNode, TaskResult, TaskStatus};
use crate::dag::TaskId;
use crate::errors::{QuerydagError, Result};
use crate::plan::QueryPlan;

#[derive(Debug)]
pub struct TaskRegistry {
    max_concurrent_tasks: usize,
    tasks: BTreeMap<TaskId, TaskNode>,
    graph: TaskGraph,
    running: BTreeSet<TaskId>,
    completed: BTreeSet<TaskId>,
    failed: BTreeSet<TaskId>,
}

impl TaskRegistry {
    pub fn new(max_concurrent_tasks: usize) -> Self {
        Self {
            max_concurrent_tasks,
            tasks: BTreeMap::new(),
            graph: TaskGraph::default(),
            running: BTreeSet::new(),
            completed: BTreeSet::new(),
            failed: BTreeSet::new(),
        }
    }

    /// Install a new task set, discarding any previous run's state.
    ///
    /// Rejects plans where a dependency references an unknown task id, a
    /// task depends on itself, or the declared edges form a cycle. The run
    /// never starts on a rejected plan.
    pub fn submit(&mut self, plan: &QueryPlan) -> Result<()> {
        validate_plan(plan)?;

        self.tasks.clear();
        self.running.clear();
        self.completed.clear();
        self.failed.clear();

        for (&id, question) in &plan.questions {
            self.tasks.insert(id, TaskNode::new(question.clone()));
        }
        self.graph = TaskGraph::from_plan(plan);

        info!(tasks = self.tasks.len(), "submitted task set to registry");
        self.log_dependency_graph();

        Ok(())
    }

    fn log_dependency_graph(&self) {
        for (&id, _) in &self.tasks {
            let deps: Vec<TaskId> = self.graph.dependencies_of(id).collect();
            if deps.is_empty() {
                debug!(task_id = id, "task has no dependencies; can start immediately");
            } else {
                debug!(task_id = id, ?deps, "task depends on prior answers");
            }
        }
    }

    /// Tasks currently eligible for dispatch, in ascending id order.
    ///
    /// Returns every task already marked `Ready`, plus each `Pending` task
    /// whose dependencies are all `Completed` and none `Failed` (marking it
    /// `Ready` as a side effect). Calling this twice without an intervening
    /// state change therefore returns the same set.
    pub fn ready_tasks(&mut self) -> Vec<TaskId> {
        let candidates: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, node)| node.status == TaskStatus::Pending)
            .map(|(&id, _)| id)
            .filter(|&id| {
                let satisfied = self
                    .graph
                    .dependencies_of(id)
                    .all(|dep| self.completed.contains(&dep));
                let blocked = self
                    .graph
                    .dependencies_of(id)
                    .any(|dep| self.failed.contains(&dep));
                satisfied && !blocked
            })
            .collect();

        for &id in &candidates {
            if let Some(node) = self.tasks.get_mut(&id) {
                node.status = TaskStatus::Ready;
                debug!(task_id = id, "dependencies satisfied; task ready");
            }
        }

        self.tasks
            .iter()
            .filter(|(_, node)| node.status == TaskStatus::Ready)
            .map(|(&id, _)| id)
            .collect()
    }

    /// [`ready_tasks`](Self::ready_tasks) truncated to the free execution
    /// slots, keeping ascending id order so dispatch is deterministic.
    pub fn schedulable_tasks(&mut self) -> Vec<TaskId> {
        let slots = self.max_concurrent_tasks.saturating_sub(self.running.len());
        let mut ready = self.ready_tasks();
        ready.truncate(slots);
        ready
    }

    /// Mark a task as dispatched, recording its start time.
    ///
    /// Unknown ids and tasks not in `Pending`/`Ready` are logged no-ops:
    /// the executor may race a dispatch decision against a failure cascade,
    /// and the registry resolves that race here rather than erroring.
    pub fn start_task(&mut self, id: TaskId) {
        match self.tasks.get_mut(&id) {
            Some(node) if matches!(node.status, TaskStatus::Pending | TaskStatus::Ready) => {
                node.status = TaskStatus::Running;
                node.started_at = Some(std::time::Instant::now());
                self.running.insert(id);
                info!(task_id = id, question = %node.question, "task started");
            }
            Some(node) => {
                debug!(task_id = id, status = ?node.status, "start ignored; task not startable");
            }
            None => {
                warn!(task_id = id, "start requested for unknown task; ignoring");
            }
        }
    }

    /// Record a successful result: `Running` → `Completed`.
    pub fn complete_task(&mut self, id: TaskId, result: TaskResult) {
        match self.tasks.get_mut(&id) {
            Some(node) if !node.status.is_terminal() => {
                node.status = TaskStatus::Completed;
                info!(
                    task_id = id,
                    execution_time = result.execution_time,
                    "task completed"
                );
                node.result = Some(result);
                self.running.remove(&id);
                self.completed.insert(id);
            }
            Some(node) => {
                debug!(task_id = id, status = ?node.status, "completion ignored; task already terminal");
            }
            None => {
                warn!(task_id = id, "completion for unknown task; ignoring");
            }
        }
    }

    /// Record a failure from any non-terminal state.
    ///
    /// Terminal tasks are left untouched, so a cascade never overwrites a
    /// completed result or an earlier, more specific error.
    pub fn fail_task(&mut self, id: TaskId, error: impl Into<String>) {
        match self.tasks.get_mut(&id) {
            Some(node) if !node.status.is_terminal() => {
                let error = error.into();
                node.status = TaskStatus::Failed;
                node.failed_after = node.started_at.map(|t| t.elapsed().as_secs_f64());
                warn!(task_id = id, error = %error, "task failed");
                node.error = Some(error);
                self.running.remove(&id);
                self.failed.insert(id);
            }
            Some(node) => {
                debug!(task_id = id, status = ?node.status, "failure ignored; task already terminal");
            }
            None => {
                warn!(task_id = id, "failure for unknown task; ignoring");
            }
        }
    }

    /// All tasks that directly or transitively require `id`.
    pub fn dependents(&self, id: TaskId) -> BTreeSet<TaskId> {
        self.graph.dependents_closure(id)
    }

    /// Whether every task has reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.completed.len() + self.failed.len() == self.tasks.len()
    }

    /// Concatenated answers of `id`'s completed dependencies, one line per
    /// dependency in ascending id order.
    ///
    /// `None` when the task has no dependencies, or none have completed
    /// yet. A `Ready` task always has full context under correct
    /// scheduling, but this accessor does not assume it.
    pub fn upstream_context(&self, id: TaskId) -> Option<String> {
        if !self.graph.has_dependencies(id) {
            return None;
        }

        let lines: Vec<String> = self
            .graph
            .dependencies_of(id)
            .filter(|dep| self.completed.contains(dep))
            .filter_map(|dep| {
                let node = self.tasks.get(&dep)?;
                let result = node.result.as_ref()?;
                Some(format!(
                    "From Question {dep} ('{}'): {}",
                    node.question, result.answer
                ))
            })
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Aggregate counters for the current run.
    pub fn summary(&self) -> ExecutionSummary {
        let total = self.tasks.len();
        let completed = self.completed.len();
        let failed = self.failed.len();
        let running = self.running.len();
        ExecutionSummary {
            total,
            completed,
            failed,
            running,
            pending: total - completed - failed - running,
            completion_rate: if total > 0 {
                completed as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Question text for a task id.
    pub fn question(&self, id: TaskId) -> Option<&str> {
        self.tasks.get(&id).map(|n| n.question.as_str())
    }

    /// Current status of a task id.
    pub fn status_of(&self, id: TaskId) -> Option<TaskStatus> {
        self.tasks.get(&id).map(|n| n.status)
    }

    /// Number of tasks currently running.
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Number of tasks in the current run.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// One [`TaskResult`] per terminal task: completed tasks carry their
    /// stored result, failed tasks a synthesized record with an empty
    /// answer and the recorded error. Non-terminal tasks are absent.
    pub fn collect_results(&self) -> BTreeMap<TaskId, TaskResult> {
        self.tasks
            .iter()
            .filter_map(|(&id, node)| {
                let result = match node.status {
                    TaskStatus::Completed => node.result.clone()?,
                    TaskStatus::Failed => TaskResult {
                        task_id: id,
                        question: node.question.clone(),
                        answer: String::new(),
                        status: TaskStatus::Failed,
                        execution_time: node.failed_after.unwrap_or(0.0),
                        error: node.error.clone(),
                    },
                    _ => return None,
                };
                Some((id, result))
            })
            .collect()
    }
}

/// Semantic validation of a plan before it is installed.
fn validate_plan(plan: &QueryPlan) -> Result<()> {
    for (&id, deps) in &plan.dependencies {
        if !plan.questions.contains_key(&id) {
            return Err(QuerydagError::ConfigError(format!(
                "dependency list references unknown task {id}"
            )));
        }
        for &dep in deps {
            if !plan.questions.contains_key(&dep) {
                return Err(QuerydagError::ConfigError(format!(
                    "task {id} depends on unknown task {dep}"
                )));
            }
            if dep == id {
                return Err(QuerydagError::ConfigError(format!(
                    "task {id} cannot depend on itself"
                )));
            }
        }
    }

    validate_acyclic(plan)
}

/// Reject cyclic dependency declarations up front, so the executor never
/// has to rely on stall detection for a bad plan.
fn validate_acyclic(plan: &QueryPlan) -> Result<()> {
    // Edge direction: dep -> task, i.e. "1 -> 2" adds edge 1 -> 2.
    let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();

    for &id in plan.questions.keys() {
        graph.add_node(id);
    }

    for (&id, deps) in &plan.dependencies {
        for &dep in deps {
            graph.add_edge(dep, id, ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(QuerydagError::DagCycle(format!(
            "cycle detected in task DAG involving task {}",
            cycle.node_id()
        ))),
    }
}
