//! End to end: run experiments, store results, render the overview.

use kbeval::eval::{
    ExperimentRunner, InMemoryMetadata, InMemoryResultStore, MatchingMode, Overview, ResultStore,
    ResultValue, TaskConfiguration, TaskResult, TaskState, TaskType,
};
use kbeval::{DatasetMetaData, Document, EvalConfig, InMemoryDataset, Marking, MockSystem};
use std::io::Write;
use std::sync::Arc;

fn finished(annotator: &str, dataset: &str, f1: f64) -> TaskResult {
    let mut result = TaskResult::new(TaskConfiguration::new(
        annotator,
        dataset,
        TaskType::A2KB,
        MatchingMode::WeakAnnotation,
    ));
    result.state = TaskState::Finished;
    result.results[TaskResult::MICRO_F1] = f1;
    result
}

#[test]
fn test_cell_formatting() {
    assert_eq!(ResultValue::Success(0.8234).format(), "0.823");
    assert_eq!(ResultValue::NotAvailable.format(), "n.a.");
    assert_eq!(ResultValue::Error(-3).format(), "error (-3)");
}

#[test]
fn test_overview_with_correlations() {
    let store = InMemoryResultStore::new();
    let mut metadata = InMemoryMetadata::new();

    // Scores rise with document count on six datasets.
    for i in 0..6 {
        let name = format!("ds{}", i);
        store.save(i, finished("steady", &name, 0.1 * (i + 1) as f64));
        metadata.insert(
            name,
            DatasetMetaData {
                number_of_documents: 10 * (i as usize + 1),
                ..Default::default()
            },
        );
    }
    // Only two datasets for this annotator: too few samples.
    store.save(10, finished("sparse", "ds0", 0.4));
    store.save(11, finished("sparse", "ds1", 0.5));

    let overview = Overview::build(&store, &metadata, TaskType::A2KB, MatchingMode::WeakAnnotation);
    let [results, correlations] = overview.tables();

    let rows = results.to_rows();
    assert_eq!(rows[0][0], "Micro F1-measure");
    assert_eq!(rows[0].len(), 7);
    assert_eq!(rows[1][0], "sparse");
    assert_eq!(rows[1][3], "n.a.");
    assert_eq!(rows[2][0], "steady");

    let rows = correlations.to_rows();
    assert_eq!(rows[0][0], "Correlations");
    assert_eq!(rows[0][1], "number of documents");
    assert_eq!(rows[1][1], "n.a.");
    assert_eq!(rows[2][1], "1.000");
    // No variance in entity counts.
    assert_eq!(rows[2][3], "n.a.");
}

#[test]
fn test_experiment_to_overview() {
    let mut experiment = ExperimentRunner::new(EvalConfig::default().with_workers(2)).unwrap();
    experiment.register_system(Arc::new(
        MockSystem::new("echo").with_markings(vec![Marking::annotation(0, 5, "Paris")]),
    ));
    experiment.register_system(Arc::new(
        MockSystem::new("broken").with_failures_per_hundred(100),
    ));
    for name in ["first", "second"] {
        let docs = (0..3)
            .map(|_| Document::new("Paris", vec![Marking::annotation(0, 5, "Paris")]))
            .collect();
        experiment.register_dataset(Arc::new(InMemoryDataset::new(name, docs)));
    }

    let store = InMemoryResultStore::new();
    let tasks = ExperimentRunner::grid(
        &["broken", "echo"],
        &["first", "second"],
        TaskType::A2KB,
        MatchingMode::WeakAnnotation,
    );
    experiment.run_all(&tasks, &store).unwrap();
    assert_eq!(store.len(), 4);

    let overview = Overview::build(
        &store,
        &InMemoryMetadata::new(),
        TaskType::A2KB,
        MatchingMode::WeakAnnotation,
    );
    let json = overview.to_json().unwrap();
    let tables: Vec<Vec<Vec<String>>> = serde_json::from_str(&json).unwrap();

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0][0], vec!["Micro F1-measure", "first", "second"]);
    assert_eq!(tables[0][1], vec!["broken", "error (-3)", "error (-3)"]);
    assert_eq!(tables[0][2], vec!["echo", "1.000", "1.000"]);
}

#[test]
fn test_store_file_round_trip() {
    let store = InMemoryResultStore::new();
    store.save(0, finished("sys", "ds", 0.25));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", store.to_json().unwrap()).unwrap();

    let loaded = InMemoryResultStore::load(file.path()).unwrap();
    let latest = loaded.latest_results(TaskType::A2KB, MatchingMode::WeakAnnotation);
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].micro_f1(), 0.25);
}
