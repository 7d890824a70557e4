// tests/property_scheduler.rs

use std::collections::BTreeSet;

use proptest::prelude::*;
use querydag::dag::{TaskRegistry, TaskResult, TaskStatus};
use querydag::plan::QueryPlan;
use querydag_test_utils::builders::PlanBuilder;

// Strategy to generate a valid DAG plan.
// Acyclicity is guaranteed by only allowing task N to depend on tasks 1..N-1.
fn plan_strategy(max_tasks: usize) -> impl Strategy<Value = QueryPlan> {
    (1..=max_tasks).prop_flat_map(move |num_tasks| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..max_tasks),
            num_tasks,
        );

        deps_strat.prop_map(move |raw_deps| {
            let mut builder = PlanBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let id = (i + 1) as u32;
                builder = builder.with_question(id, &format!("question {id}"));

                // Sanitize dependencies: only allow deps with smaller ids.
                let mut valid_deps = BTreeSet::new();
                for dep_idx in potential_deps {
                    if i > 0 {
                        valid_deps.insert(((dep_idx % i) + 1) as u32);
                    }
                }
                for dep in valid_deps {
                    builder = builder.depends_on(id, dep);
                }
            }
            builder.build()
        })
    })
}

/// Tasks that must end Failed: every injected failure plus everything
/// transitively downstream of one.
fn expected_failures(plan: &QueryPlan, failing: &BTreeSet<u32>) -> BTreeSet<u32> {
    let mut expected: BTreeSet<u32> = failing
        .iter()
        .copied()
        .filter(|id| plan.questions.contains_key(id))
        .collect();

    // Fixpoint over direct edges; small graphs, so the quadratic pass is fine.
    loop {
        let mut grew = false;
        for (&id, deps) in &plan.dependencies {
            if !expected.contains(&id) && deps.iter().any(|d| expected.contains(d)) {
                expected.insert(id);
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    expected
}

proptest! {
    #[test]
    fn random_acyclic_plans_always_terminate_correctly(
        plan in plan_strategy(8),
        failing_indices in proptest::collection::vec(0..8usize, 0..4),
        pool_size in 1..4usize,
    ) {
        let failing: BTreeSet<u32> = failing_indices
            .iter()
            .map(|&i| (i % plan.len() + 1) as u32)
            .collect();

        let mut registry = TaskRegistry::new(pool_size);
        registry.submit(&plan).unwrap();

        // Queue of tasks currently "executing", completed strictly in FIFO
        // order for determinism.
        let mut executing: Vec<u32> = Vec::new();
        let mut steps = 0;

        while !registry.is_complete() {
            steps += 1;
            prop_assert!(steps < 10_000, "simulation did not terminate");

            let schedulable = registry.schedulable_tasks();

            // Dispatch order is ascending and never overfills the pool.
            prop_assert!(schedulable.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(executing.len() + schedulable.len() <= pool_size);

            for &id in &schedulable {
                // Every dependency of a dispatched task is already Completed.
                for dep in plan.dependencies_of(id) {
                    prop_assert_eq!(registry.status_of(dep), Some(TaskStatus::Completed));
                }
                registry.start_task(id);
                executing.push(id);
            }

            prop_assert!(registry.running_count() <= pool_size);
            prop_assert!(!executing.is_empty(), "stalled with incomplete run");

            let id = executing.remove(0);
            if failing.contains(&id) {
                registry.fail_task(id, "injected failure");
                for dependent in registry.dependents(id) {
                    registry.fail_task(dependent, format!("Dependency task {id} failed"));
                }
            } else {
                let question = registry.question(id).unwrap_or_default().to_string();
                registry.complete_task(id, TaskResult {
                    task_id: id,
                    question,
                    answer: format!("answer {id}"),
                    status: TaskStatus::Completed,
                    execution_time: 0.0,
                    error: None,
                });
            }
        }

        // Exact terminal partition: failures are the injected set plus its
        // downstream closure, everything else completed.
        let expected_failed = expected_failures(&plan, &failing);
        for &id in plan.questions.keys() {
            let status = registry.status_of(id);
            if expected_failed.contains(&id) {
                prop_assert_eq!(status, Some(TaskStatus::Failed), "task {}", id);
            } else {
                prop_assert_eq!(status, Some(TaskStatus::Completed), "task {}", id);
            }
        }

        let summary = registry.summary();
        prop_assert_eq!(summary.completed + summary.failed, summary.total);
        prop_assert_eq!(summary.running, 0);
        prop_assert_eq!(summary.pending, 0);
    }
}
