use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kbeval::eval::{
    select_strategy, CorrelationAnalyzer, MatchCounts, MatchingEngine, MatchingMode,
    MetricsAggregator, ResultValue, ResultsMatrix, TaskConfiguration, TaskRunner, TaskType,
};
use kbeval::{DatasetMetaData, Document, InMemoryDataset, Marking, MockSystem};

const ENTITIES: [&str; 8] = [
    "Paris", "Rome", "Berlin", "Madrid", "Lisbon", "Vienna", "Prague", "Warsaw",
];

fn create_markings(count: usize, shift: usize) -> Vec<Marking> {
    (0..count)
        .map(|i| {
            Marking::scored(
                i * 12 + shift,
                6 + i % 4,
                ENTITIES[i % ENTITIES.len()],
                ((i * 37) % 100) as f64 / 100.0,
            )
        })
        .collect()
}

fn bench_matching(c: &mut Criterion) {
    let engine = MatchingEngine::default();
    let mut group = c.benchmark_group("matching");

    for size in [10, 100, 500] {
        let gold = create_markings(size, 0);
        let predicted = create_markings(size, 2);

        for (matching, task) in [
            (MatchingMode::WeakAnnotation, TaskType::Sa2KB),
            (MatchingMode::StrongAnnotation, TaskType::Sa2KB),
            (MatchingMode::StrongEntity, TaskType::Sc2KB),
        ] {
            let strategy = match select_strategy(matching, task) {
                Ok(s) => s,
                Err(_) => continue,
            };
            group.bench_with_input(BenchmarkId::new(matching.code(), size), &size, |b, _| {
                b.iter(|| black_box(engine.score(black_box(&predicted), black_box(&gold), &strategy)))
            });
        }
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let counts: Vec<MatchCounts> = (0..10_000)
        .map(|i| MatchCounts::new(i % 7, i % 3, i % 5))
        .collect();

    c.bench_function("aggregate_10k_documents", |b| {
        b.iter(|| {
            let mut agg = MetricsAggregator::new();
            for doc in &counts {
                agg.accumulate(*doc);
            }
            black_box(agg.finalize().to_vector())
        })
    });
}

fn bench_task_run(c: &mut Criterion) {
    let docs = (0..200)
        .map(|i| Document::new(format!("document {}", i), create_markings(20, 0)))
        .collect();
    let dataset = InMemoryDataset::new("bench", docs);
    let system = MockSystem::new("mock")
        .with_markings(create_markings(20, 1))
        .with_failures_per_hundred(5);
    let task = TaskConfiguration::new("mock", "bench", TaskType::A2KB, MatchingMode::WeakAnnotation);
    let runner = TaskRunner::default();

    let mut group = c.benchmark_group("task_run");
    group.sample_size(20);
    group.bench_function("200_documents", |b| {
        b.iter(|| black_box(runner.run(&task, &system, &dataset)))
    });
    group.finish();
}

fn bench_correlation(c: &mut Criterion) {
    let annotators: Vec<String> = (0..20).map(|i| format!("sys{}", i)).collect();
    let datasets: Vec<String> = (0..30).map(|i| format!("ds{}", i)).collect();
    let mut matrix = ResultsMatrix::new(annotators.clone(), datasets.clone());
    for (a, annotator) in annotators.iter().enumerate() {
        for (d, dataset) in datasets.iter().enumerate() {
            let score = ((a * 31 + d * 17) % 100) as f64 / 100.0;
            matrix.set(annotator, dataset, ResultValue::Success(score));
        }
    }
    let metadata: Vec<Option<DatasetMetaData>> = (0..30)
        .map(|d| {
            Some(DatasetMetaData {
                number_of_documents: 10 + d * 3,
                avg_document_length: 100.0 + (d % 7) as f64,
                number_of_entities: 50 + (d * 13) % 40,
                ..Default::default()
            })
        })
        .collect();
    let analyzer = CorrelationAnalyzer::new();

    c.bench_function("correlate_20x30", |b| {
        b.iter(|| black_box(analyzer.correlate(&matrix, &metadata)))
    });
}

criterion_group!(
    benches,
    bench_matching,
    bench_aggregation,
    bench_task_run,
    bench_correlation
);
criterion_main!(benches);
