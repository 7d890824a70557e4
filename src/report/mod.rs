// src/report/mod.rs

//! Final report assembly.
//!
//! The layout is a fixed contract with downstream renderers: for each task
//! id in ascending order, a `Q<id>:` line, an `A<id>:` line, and a blank
//! separator line. Failed tasks render `[FAILED] <error>`; tasks that never
//! reached a terminal state render `[NOT EXECUTED]`.

use std::collections::BTreeMap;

use crate::dag::{TaskId, TaskResult, TaskStatus};

/// Render the per-task report for one run.
///
/// `questions` is the authoritative task set; `results` may be missing
/// entries for tasks that never executed. Completion order plays no part
/// here: output is re-sorted by task id via the ordered maps.
pub fn format_report(
    questions: &BTreeMap<TaskId, String>,
    results: &BTreeMap<TaskId, TaskResult>,
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(questions.len() * 3);

    for (&task_id, question) in questions {
        parts.push(format!("Q{task_id}: {question}"));
        match results.get(&task_id) {
            Some(result) if result.status == TaskStatus::Completed => {
                parts.push(format!("A{task_id}: {}", result.answer));
            }
            Some(result) => {
                let error = result.error.as_deref().unwrap_or("Unknown error");
                parts.push(format!("A{task_id}: [FAILED] {error}"));
            }
            None => {
                parts.push(format!("A{task_id}: [NOT EXECUTED]"));
            }
        }
        parts.push(String::new());
    }

    parts.join("\n")
}
