#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use querydag::dag::TaskId;
use querydag::plan::QueryPlan;

/// Builder for `QueryPlan` to simplify test setup.
pub struct PlanBuilder {
    questions: BTreeMap<TaskId, String>,
    dependencies: HashMap<TaskId, BTreeSet<TaskId>>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self {
            questions: BTreeMap::new(),
            dependencies: HashMap::new(),
        }
    }

    pub fn with_question(mut self, id: TaskId, question: &str) -> Self {
        self.questions.insert(id, question.to_string());
        self
    }

    /// Declare that `task` depends on `dep`.
    pub fn depends_on(mut self, task: TaskId, dep: TaskId) -> Self {
        self.dependencies.entry(task).or_default().insert(dep);
        self
    }

    pub fn build(self) -> QueryPlan {
        QueryPlan {
            questions: self.questions,
            dependencies: self.dependencies,
        }
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}
