// tests/plan_parsing.rs

use querydag::dag::TaskRegistry;
use querydag::errors::QuerydagError;
use querydag::plan::parse_plan;
use querydag_test_utils::builders::PlanBuilder;
use querydag_test_utils::init_tracing;

#[test]
fn parses_numbered_questions() {
    init_tracing();

    let plan = parse_plan(
        "1. What country is AS12345 registered in?\n2. What hijacks occurred there?\n",
        "1\n1 -> 2\n",
    );

    assert_eq!(plan.len(), 2);
    assert_eq!(
        plan.questions.get(&1).map(String::as_str),
        Some("What country is AS12345 registered in?")
    );
    assert_eq!(
        plan.questions.get(&2).map(String::as_str),
        Some("What hijacks occurred there?")
    );
    let deps: Vec<u32> = plan.dependencies_of(2).collect();
    assert_eq!(deps, vec![1]);
}

#[test]
fn question_ids_need_not_be_contiguous() {
    let plan = parse_plan("3. Third\n7. Seventh\n", "3\n7\n");
    assert_eq!(plan.questions.keys().copied().collect::<Vec<_>>(), vec![3, 7]);
    assert!(plan.dependencies.is_empty());
}

#[test]
fn skips_malformed_question_lines() {
    let plan = parse_plan(
        "Here are the sub-questions:\n1. First\nnot numbered\n2 missing dot\n2. Second\n",
        "",
    );
    assert_eq!(plan.questions.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn dependencies_accumulate_via_union() {
    let plan = parse_plan(
        "1. A\n2. B\n3. C\n",
        "1 -> 3\n2 -> 3\n1 -> 3\n",
    );
    let deps: Vec<u32> = plan.dependencies_of(3).collect();
    assert_eq!(deps, vec![1, 2]);
}

#[test]
fn bare_integer_lines_declare_no_edges() {
    let plan = parse_plan("1. A\n2. B\n", "1\n2\n");
    assert!(plan.dependencies.is_empty());
}

#[test]
fn skips_malformed_dependency_lines() {
    let plan = parse_plan(
        "1. A\n2. B\n3. C\n",
        "1 -> 2\nnot an edge\n1 -> \n1 -> 2 -> 3\n",
    );
    // Only the well-formed edge survives; the chain of three is dropped, not
    // partially applied.
    assert_eq!(plan.dependencies_of(2).collect::<Vec<_>>(), vec![1]);
    assert!(plan.dependencies.get(&3).is_none());
}

#[test]
fn whitespace_around_ids_and_text_is_tolerated() {
    let plan = parse_plan("  1.   Question one  \n", "  1  \n");
    assert_eq!(
        plan.questions.get(&1).map(String::as_str),
        Some("Question one")
    );
}

#[test]
fn submit_rejects_unknown_dependency_id() {
    let plan = parse_plan("1. A\n2. B\n", "1 -> 2\n5 -> 2\n");

    let mut registry = TaskRegistry::new(2);
    let err = registry.submit(&plan).unwrap_err();
    assert!(matches!(err, QuerydagError::ConfigError(_)), "got {err:?}");
}

#[test]
fn submit_rejects_dependent_task_absent_from_questions() {
    let plan = parse_plan("1. A\n", "1 -> 9\n");

    let mut registry = TaskRegistry::new(2);
    let err = registry.submit(&plan).unwrap_err();
    assert!(matches!(err, QuerydagError::ConfigError(_)), "got {err:?}");
}

#[test]
fn submit_rejects_self_dependency() {
    let plan = PlanBuilder::new()
        .with_question(1, "A")
        .depends_on(1, 1)
        .build();

    let mut registry = TaskRegistry::new(2);
    let err = registry.submit(&plan).unwrap_err();
    assert!(matches!(err, QuerydagError::ConfigError(_)), "got {err:?}");
}

#[test]
fn submit_rejects_cycles() {
    let plan = PlanBuilder::new()
        .with_question(1, "A")
        .with_question(2, "B")
        .with_question(3, "C")
        .depends_on(2, 1)
        .depends_on(3, 2)
        .depends_on(1, 3)
        .build();

    let mut registry = TaskRegistry::new(2);
    let err = registry.submit(&plan).unwrap_err();
    assert!(matches!(err, QuerydagError::DagCycle(_)), "got {err:?}");
}
