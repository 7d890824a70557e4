// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::dag::TaskId;
use crate::plan::QueryPlan;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct GraphNode {
    /// Direct dependencies: tasks that must complete before this one can run.
    deps: BTreeSet<TaskId>,
    /// Direct dependents: tasks that depend on this one.
    dependents: BTreeSet<TaskId>,
}

/// Adjacency index over one submitted plan.
///
/// Built once per submission, after validation has established that every
/// referenced id exists and the edges are acyclic. The reverse edges exist
/// so that failure cascading is a plain reachability query instead of a
/// scan per step.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: BTreeMap<TaskId, GraphNode>,
}

impl TaskGraph {
    /// Build the adjacency index from a validated plan.
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let mut nodes: BTreeMap<TaskId, GraphNode> = BTreeMap::new();

        for &id in plan.questions.keys() {
            nodes.entry(id).or_default();
        }

        for (&id, deps) in &plan.dependencies {
            for &dep in deps {
                nodes.entry(id).or_default().deps.insert(dep);
                nodes.entry(dep).or_default().dependents.insert(id);
            }
        }

        Self { nodes }
    }

    /// Immediate dependencies of a task, in ascending id order.
    pub fn dependencies_of(&self, id: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.deps.iter().copied())
    }

    /// Whether the task declares any dependencies.
    pub fn has_dependencies(&self, id: TaskId) -> bool {
        self.nodes.get(&id).is_some_and(|n| !n.deps.is_empty())
    }

    /// All tasks that transitively depend on `id`, as a fresh set.
    ///
    /// Iterative BFS over the reverse edges; `id` itself is not included.
    pub fn dependents_closure(&self, id: TaskId) -> BTreeSet<TaskId> {
        let mut closure = BTreeSet::new();
        let mut stack: Vec<TaskId> = match self.nodes.get(&id) {
            Some(node) => node.dependents.iter().copied().collect(),
            None => return closure,
        };

        while let Some(current) = stack.pop() {
            if !closure.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.dependents.iter().copied());
            }
        }

        closure
    }
}
