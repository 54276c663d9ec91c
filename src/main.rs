use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use solvent_io::{
    CATEGORICAL_COLUMNS, ClientTable, ConfusionRecord, DatasetReader, MetricsRecord,
    MetricsReport, MetricsWriter, Split, clean,
};
use solvent_rf::{
    BinaryConfusion, GridSearch, GridSearchOutcome, ParamGrid, PipelineConfig,
    RandomForestConfig,
};

/// Zip-compressed training CSV.
const TRAIN_DATA_PATH: &str = "files/input/train_data.csv.zip";
/// Zip-compressed test CSV.
const TEST_DATA_PATH: &str = "files/input/test_data.csv.zip";
/// Directory for the serialized model.
const MODELS_DIR: &str = "files/models";
/// Gzip-compressed serialized pipeline.
const MODEL_FILE: &str = "model.bin.gz";
/// Directory for the metrics JSON-lines file.
const OUTPUT_DIR: &str = "files/output";

#[derive(Parser)]
#[command(name = "solvent")]
#[command(about = "Credit-card default classifier: grid-searched random forest training job")]
#[command(version)]
struct Cli {
    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of cross-validation folds for the grid search
    #[arg(long, default_value_t = 5)]
    cv_folds: usize,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct RunSummary {
    n_train: usize,
    n_test: usize,
    n_features: usize,
    n_candidates: usize,
    cv_folds: usize,
    best_params: BestParamsOutput,
    best_cv_balanced_accuracy: f64,
    test_balanced_accuracy: f64,
    model_path: String,
    metrics_path: String,
}

#[derive(Serialize)]
struct BestParamsOutput {
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

/// The fixed search space for the forest stage.
fn param_grid() -> ParamGrid {
    ParamGrid {
        n_estimators: vec![5, 10, 20],
        max_depth: vec![None, Some(5), Some(10), Some(15)],
        min_samples_split: vec![2, 3, 5],
        min_samples_leaf: vec![1, 2, 2],
    }
}

fn load_clean(path: &str) -> Result<ClientTable> {
    let raw = DatasetReader::new(Path::new(path))
        .read()
        .with_context(|| format!("failed to read dataset {path}"))?;
    let table = clean(raw).with_context(|| format!("failed to clean dataset {path}"))?;
    Ok(table)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    // 1. Load and clean both splits
    let train = load_clean(TRAIN_DATA_PATH)?;
    let test = load_clean(TEST_DATA_PATH)?;
    info!(n_train = train.n_rows(), n_test = test.n_rows(), "datasets ready");

    let feature_names = train.feature_names();
    let x_train = train.features();
    let y_train = train.labels();
    let x_test = test.features();
    let y_test = test.labels();

    // 2. Grid-search the pipeline on the training split
    let categorical: Vec<String> = CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect();
    let forest = RandomForestConfig::new(100)?.with_seed(cli.seed);
    let pipeline = PipelineConfig::new(categorical, forest);

    let search = GridSearch::new(param_grid(), cli.cv_folds)?.with_seed(cli.seed);
    let GridSearchOutcome {
        pipeline: fitted,
        best_params,
        best_score,
        n_candidates,
    } = search
        .fit(&pipeline, &feature_names, &x_train, &y_train)
        .context("grid search failed")?;

    // 3. Save the fitted pipeline
    let model_path = PathBuf::from(MODELS_DIR).join(MODEL_FILE);
    fitted
        .save(&model_path)
        .context("failed to save model")?;
    info!(path = %model_path.display(), "model saved");

    // 4. Predict both splits and build the four records
    let y_train_pred = fitted
        .predict(&x_train)
        .context("training-set prediction failed")?;
    let y_test_pred = fitted
        .predict(&x_test)
        .context("test-set prediction failed")?;

    let train_confusion = BinaryConfusion::from_labels(&y_train, &y_train_pred)?;
    let test_confusion = BinaryConfusion::from_labels(&y_test, &y_test_pred)?;
    info!(
        train_balanced_accuracy = train_confusion.balanced_accuracy(),
        test_balanced_accuracy = test_confusion.balanced_accuracy(),
        "evaluation complete"
    );

    let report = MetricsReport {
        train_metrics: MetricsRecord::new(
            Split::Train,
            train_confusion.precision(),
            train_confusion.balanced_accuracy(),
            train_confusion.recall(),
            train_confusion.f1(),
        ),
        test_metrics: MetricsRecord::new(
            Split::Test,
            test_confusion.precision(),
            test_confusion.balanced_accuracy(),
            test_confusion.recall(),
            test_confusion.f1(),
        ),
        train_confusion: ConfusionRecord::new(Split::Train, train_confusion.counts()),
        test_confusion: ConfusionRecord::new(Split::Test, test_confusion.counts()),
    };

    // 5. Write the JSON-lines report
    let writer = MetricsWriter::new(Path::new(OUTPUT_DIR))?;
    writer.write_report(&report)?;

    // 6. Print stdout summary
    let summary = RunSummary {
        n_train: train.n_rows(),
        n_test: test.n_rows(),
        n_features: feature_names.len(),
        n_candidates,
        cv_folds: cli.cv_folds,
        best_params: BestParamsOutput {
            n_estimators: best_params.n_estimators,
            max_depth: best_params.max_depth,
            min_samples_split: best_params.min_samples_split,
            min_samples_leaf: best_params.min_samples_leaf,
        },
        best_cv_balanced_accuracy: best_score,
        test_balanced_accuracy: test_confusion.balanced_accuracy(),
        model_path: model_path.display().to_string(),
        metrics_path: writer.metrics_path().display().to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
