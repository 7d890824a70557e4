// src/plan/parse.rs

//! Line-oriented parsing of decomposer output.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::dag::TaskId;
use crate::plan::QueryPlan;

/// Matches a numbered question line such as `3. What country is AS12345 in?`.
static QUESTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.+)$").expect("question line regex is valid"));

/// Parse decomposer output into a [`QueryPlan`].
///
/// `questions` holds one `<id>. <text>` entry per line. `dependencies` holds
/// one entry per line, either a bare task id (an independent task) or
/// `<from> -> <to>`, meaning `to` depends on `from`. Dependencies for the
/// same task accumulate across lines via set union.
///
/// Lines that match neither form are dropped, matching the upstream
/// producer's tolerance for decoration around the lists, but each drop is
/// logged so a systematically malformed plan is visible.
pub fn parse_plan(questions: &str, dependencies: &str) -> QueryPlan {
    let mut plan = QueryPlan::default();

    for line in questions.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match QUESTION_LINE.captures(line) {
            Some(caps) => {
                // Both captures are guaranteed by the pattern; the id fits
                // u32 for any realistic plan, otherwise the line is dropped
                // like any other malformed one.
                let Ok(id) = caps[1].parse::<TaskId>() else {
                    warn!(line, "question index out of range; skipping line");
                    continue;
                };
                let text = caps[2].trim().to_string();
                plan.questions.insert(id, text);
            }
            None => {
                warn!(line, "unparsable question line; skipping");
            }
        }
    }

    for line in dependencies.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split("->").map(str::trim).collect();
        let ids: Option<Vec<TaskId>> = parts.iter().map(|p| p.parse().ok()).collect();

        match ids.as_deref() {
            // A bare task id declares an independent task; no edge to record.
            Some([_single]) => {}
            Some([from, to]) => {
                plan.dependencies.entry(*to).or_default().insert(*from);
            }
            _ => {
                warn!(line, "unparsable dependency line; skipping");
            }
        }
    }

    debug!(
        questions = plan.questions.len(),
        edges = plan.dependencies.values().map(|d| d.len()).sum::<usize>(),
        "parsed query plan"
    );

    plan
}
