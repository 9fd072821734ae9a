//! Strategy selection and matching behaviour across task types.

use kbeval::eval::{
    select_strategy, MatchCounts, MatchRelation, MatchingEngine, MatchingMode, TaskConfiguration,
    TaskRunner, TaskType,
};
use kbeval::{Document, InMemoryDataset, Marking, MockSystem};

/// Expected relation for every (mode, task) pair; `None` = unsupported.
fn expected(matching: MatchingMode, task: TaskType) -> Option<MatchRelation> {
    use MatchingMode::*;
    use TaskType::*;
    match (matching, task) {
        (WeakAnnotation, A2KB | Sa2KB) => Some(MatchRelation::WeakAnnotationMatch),
        (StrongAnnotation, D2KB | A2KB | Sa2KB) => Some(MatchRelation::StrongAnnotationMatch),
        (StrongEntity, C2KB | Rc2KB | Sc2KB) => Some(MatchRelation::StrongTagMatch),
        _ => None,
    }
}

#[test]
fn test_exhaustive_selection_table() {
    let mut supported = 0;
    for &matching in MatchingMode::all() {
        for &task in TaskType::all() {
            let selected = select_strategy(matching, task).ok().map(|s| s.relation);
            assert_eq!(selected, expected(matching, task), "{} / {}", matching, task);
            if let Ok(strategy) = select_strategy(matching, task) {
                assert_eq!(strategy.task, task);
                supported += 1;
            }
        }
    }
    assert_eq!(supported, 8);
}

#[test]
fn test_selection_follows_containment() {
    for &task in TaskType::all() {
        assert_eq!(
            select_strategy(MatchingMode::WeakAnnotation, task).is_ok(),
            task.contains(TaskType::A2KB)
        );
        assert_eq!(
            select_strategy(MatchingMode::StrongAnnotation, task).is_ok(),
            task.contains(TaskType::D2KB)
        );
        assert_eq!(
            select_strategy(MatchingMode::StrongEntity, task).is_ok(),
            TaskType::Sc2KB.contains(task)
        );
    }
}

#[test]
fn test_same_output_scored_three_ways() {
    let gold = vec![
        Marking::annotation(0, 6, "Angela_Merkel"),
        Marking::annotation(20, 6, "Berlin"),
    ];
    let predicted = vec![
        Marking::scored(0, 13, "Angela_Merkel", 0.9), // overlaps, longer
        Marking::scored(20, 6, "Berlin", 0.8),        // exact
        Marking::scored(40, 5, "Germany", 0.3),       // spurious
    ];
    let engine = MatchingEngine::default();

    let weak = select_strategy(MatchingMode::WeakAnnotation, TaskType::Sa2KB).unwrap();
    assert_eq!(engine.score(&predicted, &gold, &weak), MatchCounts::new(2, 1, 0));

    let strong = select_strategy(MatchingMode::StrongAnnotation, TaskType::Sa2KB).unwrap();
    assert_eq!(engine.score(&predicted, &gold, &strong), MatchCounts::new(1, 2, 1));

    let tags = select_strategy(MatchingMode::StrongEntity, TaskType::Sc2KB).unwrap();
    assert_eq!(engine.score(&predicted, &gold, &tags), MatchCounts::new(2, 1, 0));
}

#[test]
fn test_unlinked_markings_compare_only_to_unlinked() {
    let engine = MatchingEngine::default();
    let strong = select_strategy(MatchingMode::StrongAnnotation, TaskType::A2KB).unwrap();

    let gold = vec![Marking::span(0, 4)];
    assert_eq!(
        engine.score(&[Marking::span(0, 4)], &gold, &strong),
        MatchCounts::new(1, 0, 0)
    );
    assert_eq!(
        engine.score(&[Marking::annotation(0, 4, "Rome")], &gold, &strong),
        MatchCounts::new(0, 1, 1)
    );
}

#[test]
fn test_runner_rejects_unsupported_pair() {
    let dataset = InMemoryDataset::new(
        "one",
        vec![Document::new("Rome", vec![Marking::annotation(0, 4, "Rome")])],
    );
    let system = MockSystem::new("mock");

    for &matching in MatchingMode::all() {
        for &task in TaskType::all() {
            let config = TaskConfiguration::new("mock", "one", task, matching);
            let result = TaskRunner::default().run(&config, &system, &dataset);
            if expected(matching, task).is_some() {
                assert!(result.is_finished(), "{}", config);
            } else {
                assert_eq!(result.state_code(), -4, "{}", config);
                assert_eq!(result.documents_attempted, 0);
            }
        }
    }
}
