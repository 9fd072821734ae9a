//! kbeval - score annotation systems against gold datasets
//!
//! # Usage
//!
//! ```bash
//! # Score recorded system output against a gold dataset
//! kbeval score --dataset gold.json --predictions output.json --task A2KB --matching weak-annotation
//!
//! # Keep the result for later overviews
//! kbeval score -d gold.json -p output.json --save results.json
//!
//! # Results and correlation tables for one task type and matching mode
//! kbeval overview --results results.json --metadata metadata.json --task A2KB
//!
//! # Derive descriptive metadata of a dataset
//! kbeval describe --dataset gold.json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use kbeval::eval::{
    InMemoryMetadata, InMemoryResultStore, MatchingMode, Overview, ResultStore,
    TaskConfiguration, TaskRunner, TaskType,
};
use kbeval::{AnnotationSystem, Dataset, DatasetMetaData, EvalConfig, InMemoryDataset, RecordedSystem};

#[derive(Parser)]
#[command(name = "kbeval")]
#[command(author, version, about = "Benchmark evaluation of entity annotation systems")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score recorded system output against a gold dataset
    #[command(visible_alias = "s")]
    Score(ScoreArgs),

    /// Print results and correlation tables as JSON
    #[command(visible_alias = "o")]
    Overview(OverviewArgs),

    /// Print descriptive metadata of a dataset as JSON
    #[command(visible_alias = "d")]
    Describe(DescribeArgs),
}

#[derive(Parser)]
struct ScoreArgs {
    /// Gold dataset (JSON document file)
    #[arg(short, long)]
    dataset: PathBuf,

    /// Recorded system output (JSON document file)
    #[arg(short, long)]
    predictions: PathBuf,

    /// Task type (D2KB, A2KB, Sa2KB, C2KB, Sc2KB, Rc2KB)
    #[arg(short, long, default_value = "A2KB")]
    task: TaskType,

    /// Matching mode (weak-annotation, strong-annotation, strong-entity)
    #[arg(short, long, default_value = "weak-annotation")]
    matching: MatchingMode,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append the result to this JSON results file
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Parser)]
struct OverviewArgs {
    /// JSON results file
    #[arg(short, long)]
    results: PathBuf,

    /// JSON metadata file (object keyed by dataset name)
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Task type
    #[arg(short, long, default_value = "A2KB")]
    task: TaskType,

    /// Matching mode
    #[arg(short, long, default_value = "weak-annotation")]
    matching: MatchingMode,

    /// Print aligned text tables instead of JSON
    #[arg(long)]
    text: bool,
}

#[derive(Parser)]
struct DescribeArgs {
    /// Gold dataset (JSON document file)
    #[arg(short, long)]
    dataset: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Score(args) => cmd_score(args),
        Commands::Overview(args) => cmd_overview(args),
        Commands::Describe(args) => cmd_describe(args),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn cmd_score(args: ScoreArgs) -> kbeval::Result<ExitCode> {
    let config = match &args.config {
        Some(path) => EvalConfig::load(path)?,
        None => EvalConfig::default(),
    };
    let dataset = InMemoryDataset::load(&args.dataset)?;
    let system = RecordedSystem::load(&args.predictions)?;

    let task = TaskConfiguration::new(system.name(), dataset.name(), args.task, args.matching);
    let result = TaskRunner::with_config(config.runner)?.run(&task, &system, &dataset);

    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(path) = &args.save {
        let store = if path.exists() {
            InMemoryResultStore::load(path)?
        } else {
            InMemoryResultStore::new()
        };
        let id = store.next_id();
        store.save(id, result.clone());
        std::fs::write(path, store.to_json()?)?;
        log::info!("Saved result as task {} in {}", id, path.display());
    }

    Ok(if result.is_finished() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn cmd_overview(args: OverviewArgs) -> kbeval::Result<ExitCode> {
    let store = InMemoryResultStore::load(&args.results)?;
    let metadata = match &args.metadata {
        Some(path) => InMemoryMetadata::load(path)?,
        None => InMemoryMetadata::new(),
    };

    let overview = Overview::build(&store, &metadata, args.task, args.matching);
    if args.text {
        for table in overview.tables() {
            println!("{}", table);
        }
    } else {
        println!("{}", overview.to_json()?);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_describe(args: DescribeArgs) -> kbeval::Result<ExitCode> {
    let dataset = InMemoryDataset::load(&args.dataset)?;
    let metadata = DatasetMetaData::describe(&dataset)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(ExitCode::SUCCESS)
}
