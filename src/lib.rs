// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod report;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, SchedulerConfig};
use crate::dag::{TaskId, TaskRegistry, TaskResult, TaskStatus};
use crate::errors::Result;
use crate::exec::driver::invoke_backend;
use crate::exec::{AnswerBackend, DagExecutor, EchoBackend, TaskOutcome};
use crate::plan::QueryPlan;

/// Execute a parsed plan against an answering backend and render the
/// per-question report.
///
/// Validation failures (unknown dependency ids, self-dependencies, cycles,
/// see [`TaskRegistry::submit`]) abort before anything runs. After that,
/// individual task failures are captured in the report, never surfaced as
/// errors; only a stalled run is a run-level failure.
pub async fn execute_plan<B>(
    plan: &QueryPlan,
    backend: Arc<B>,
    config: &SchedulerConfig,
) -> Result<String>
where
    B: AnswerBackend + 'static,
{
    let mut registry = TaskRegistry::new(config.max_concurrent_tasks);
    registry.submit(plan)?;

    // A lone question needs no dependency bookkeeping: call the backend
    // directly. The rendered output is identical to the pooled path.
    if let Some((&task_id, question)) = sole_question(plan) {
        let result = answer_single(task_id, question, backend, config).await;
        let mut results = BTreeMap::new();
        results.insert(task_id, result);
        return Ok(report::format_report(&plan.questions, &results));
    }

    let executor = DagExecutor::new(registry, backend, config.task_timeout());
    let run = executor.run().await?;

    info!(
        total = run.summary.total,
        completed = run.summary.completed,
        failed = run.summary.failed,
        completion_rate = run.summary.completion_rate,
        "execution summary"
    );

    Ok(report::format_report(&plan.questions, &run.results))
}

fn sole_question(plan: &QueryPlan) -> Option<(&TaskId, &String)> {
    if plan.len() == 1 {
        plan.questions.iter().next()
    } else {
        None
    }
}

/// Answer a single-task plan without the pool machinery.
async fn answer_single<B: AnswerBackend + 'static>(
    task_id: TaskId,
    question: &str,
    backend: Arc<B>,
    config: &SchedulerConfig,
) -> TaskResult {
    debug!(task_id, "single-question plan; answering directly");

    let outcome = invoke_backend(
        backend,
        question.to_string(),
        None,
        config.task_timeout(),
    )
    .await;

    match outcome {
        TaskOutcome::Answered { answer, elapsed } => TaskResult {
            task_id,
            question: question.to_string(),
            answer,
            status: TaskStatus::Completed,
            execution_time: elapsed,
            error: None,
        },
        TaskOutcome::Errored { error, elapsed } => TaskResult {
            task_id,
            question: question.to_string(),
            answer: String::new(),
            status: TaskStatus::Failed,
            execution_time: elapsed,
            error: Some(error),
        },
    }
}

/// High-level entry point used by `main.rs`.
///
/// Loads the plan files and config, then either prints the validated plan
/// (`--dry-run`) or simulates execution with the echo backend. Real
/// deployments embed the library and supply their own [`AnswerBackend`].
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = load_or_default(args.config.as_deref().map(Path::new))?;

    let questions = std::fs::read_to_string(&args.questions)?;
    let dependencies = std::fs::read_to_string(&args.deps)?;
    let plan = plan::parse_plan(&questions, &dependencies);

    if args.dry_run {
        // Validation runs through the same path as real submission.
        let mut registry = TaskRegistry::new(config.max_concurrent_tasks);
        registry.submit(&plan)?;
        print_dry_run(&plan, &config);
        return Ok(());
    }

    let report = execute_plan(&plan, Arc::new(EchoBackend), &config).await?;
    println!("{report}");

    Ok(())
}

/// Simple dry-run output: print tasks and their dependencies.
fn print_dry_run(plan: &QueryPlan, config: &SchedulerConfig) {
    println!("querydag dry-run");
    println!("  max_concurrent_tasks = {}", config.max_concurrent_tasks);
    match config.task_timeout_secs {
        Some(secs) => println!("  task_timeout_secs = {secs}"),
        None => println!("  task_timeout_secs = (none)"),
    }
    println!();

    println!("tasks ({}):", plan.len());
    for (id, question) in &plan.questions {
        println!("  {id}. {question}");
        let deps: Vec<TaskId> = plan.dependencies_of(*id).collect();
        if !deps.is_empty() {
            println!("      after: {deps:?}");
        }
    }
}
