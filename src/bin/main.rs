//! OncoForest Command Line Interface
//!
//! Train, evaluate, inspect and serve random forest cancer-risk models.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{debug, error, info};
use oncoforest::api::RandomForest;
use oncoforest::core::Result;
use oncoforest::data::{train_test_split, TabularDataset};
use oncoforest::evaluation::EvaluationReport;
use oncoforest::interactive::{self, Outcome};
use oncoforest::persistence::{save_model, SerializableModel};
use oncoforest::plots::{self, save_report_plots};
use oncoforest::server::{run_server, ServerConfig};
use oncoforest::utils::{stats, validation};
use oncoforest::{Dataset, MaxFeatures};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "oncoforest")]
#[command(about = "Random forest cancer-risk classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "OncoForest Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model, report held-out metrics and save it
    Train(TrainArgs),
    /// Evaluate a saved model on labeled data
    Evaluate(EvaluateArgs),
    /// Prompt for patient details and predict interactively
    Predict(PredictArgs),
    /// Serve predictions over HTTP
    Serve(ServeArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data (CSV with a Diagnosis column)
    #[arg(long, env = "ONCOFOREST_DATA", default_value = "The_Cancer_data_1500_V2.csv")]
    data: PathBuf,

    /// Output model file
    #[arg(short, long, env = "ONCOFOREST_MODEL", default_value = "cancer_detection.bin")]
    model: PathBuf,

    /// Directory for the report charts
    #[arg(long, env = "ONCOFOREST_REPORT_DIR", default_value = ".")]
    report_dir: PathBuf,

    /// Skip writing report charts
    #[arg(long)]
    no_plots: bool,

    /// Fraction of rows held out for testing
    #[arg(long, default_value = "0.2")]
    test_ratio: f64,

    /// Seed for splitting and tree growth
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of trees
    #[arg(short, long, default_value = "100")]
    n_trees: usize,

    /// Maximum tree depth (unbounded if omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Features examined per split
    #[arg(long, default_value = "sqrt")]
    max_features: CliMaxFeatures,

    /// Cross-validation folds on the training partition
    #[arg(long, default_value = "5")]
    folds: usize,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliMaxFeatures {
    /// Square root of the feature count, rounded up
    #[value(name = "sqrt")]
    Sqrt,
    /// Every feature at every split
    #[value(name = "all")]
    All,
}

impl From<CliMaxFeatures> for MaxFeatures {
    fn from(cli: CliMaxFeatures) -> Self {
        match cli {
            CliMaxFeatures::Sqrt => MaxFeatures::Sqrt,
            CliMaxFeatures::All => MaxFeatures::All,
        }
    }
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long, env = "ONCOFOREST_MODEL", default_value = "cancer_detection.bin")]
    model: PathBuf,

    /// Labeled test data
    #[arg(long, env = "ONCOFOREST_DATA", default_value = "The_Cancer_data_1500_V2.csv")]
    data: PathBuf,

    /// Also write report charts into this directory
    #[arg(long)]
    report_dir: Option<PathBuf>,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long, env = "ONCOFOREST_MODEL", default_value = "cancer_detection.bin")]
    model: PathBuf,
}

#[derive(Args)]
struct ServeArgs {
    /// Trained model file
    #[arg(short, long, env = "ONCOFOREST_MODEL", default_value = "cancer_detection.bin")]
    model: PathBuf,

    /// Listen address
    #[arg(long, env = "ONCOFOREST_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(short, long, env = "ONCOFOREST_PORT", default_value = "5000")]
    port: u16,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "2")]
    timeout_secs: u64,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    #[arg(env = "ONCOFOREST_MODEL", default_value = "cancer_detection.bin")]
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Predict(args) => match predict_command(args) {
            // The attempt has already been reported on stdout
            Ok(Outcome::Rejected(_)) | Ok(Outcome::Unavailable(_)) => process::exit(1),
            Ok(Outcome::Predicted(_)) => Ok(()),
            Err(e) => Err(e),
        },
        Commands::Serve(args) => serve_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Loading dataset from {:?}", args.data);
    let dataset = TabularDataset::from_file(&args.data)?;
    println!("Dataset loaded successfully.");
    validation::log_class_distribution("Full dataset", &dataset);
    for s in stats::feature_stats(&dataset) {
        debug!(
            "{}: min {:.3}, max {:.3}, mean {:.3}, sd {:.3}",
            s.name, s.min, s.max, s.mean, s.std_dev
        );
    }

    let partition = train_test_split(&dataset, args.test_ratio, args.seed)?;
    validation::log_class_distribution("Training partition", &partition.train);
    validation::log_class_distribution("Test partition", &partition.test);

    let mut builder = RandomForest::new()
        .with_n_trees(args.n_trees)
        .with_seed(args.seed)
        .with_max_features(args.max_features.into());
    if let Some(depth) = args.max_depth {
        builder = builder.with_max_depth(depth);
    }

    info!(
        "Training {} trees on {} rows",
        args.n_trees,
        partition.train.len()
    );
    let model = builder.clone().train(&partition.train)?;

    save_model(&model, &args.model)?;
    println!("Model saved at {}.", args.model.display());

    let scores = builder.cross_validate(&partition.train, args.folds)?;
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let shown: Vec<String> = scores.iter().map(|s| format!("{s:.4}")).collect();
    println!("Cross-validation scores (training set): [{}]", shown.join(", "));
    println!("Mean cross-validation score: {mean:.4}");

    let report = model.evaluate_detailed(&partition.test)?;
    print_report(&report);

    if !args.no_plots {
        write_plots(&report, &args.report_dir)?;
    }

    Ok(())
}

fn print_report(report: &EvaluationReport) {
    println!("\nClassification Report:");
    println!("{}", report.classification);

    println!("\nAccuracy Score:");
    println!("{:.4}", report.accuracy());

    println!("\n{}", report.confusion);

    match report.roc.auc {
        Some(auc) => println!("\nROC AUC: {auc:.4}"),
        None => println!("\nROC AUC: undefined (test set has a single class)"),
    }

    println!("\nFeature Importance:");
    for feature in &report.importances {
        println!("  {:<18} {:.4}", feature.name, feature.importance);
    }
}

fn write_plots(report: &EvaluationReport, dir: &Path) -> Result<()> {
    println!("\nGenerating plots...");
    save_report_plots(report, dir)?;
    println!("ROC curve plot saved as '{}'", dir.join(plots::ROC_FILE).display());
    println!(
        "Feature importance plot saved as '{}'",
        dir.join(plots::IMPORTANCE_FILE).display()
    );
    println!(
        "Confusion matrix plot saved as '{}'",
        dir.join(plots::CONFUSION_FILE).display()
    );
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = SerializableModel::load_from_file(&args.model)?.to_trained_model()?;

    info!("Loading test data from: {:?}", args.data);
    let dataset = TabularDataset::from_file(&args.data)?;
    validation::log_class_distribution("Evaluation data", &dataset);

    let report = model.evaluate_detailed(&dataset)?;

    println!("=== Model Evaluation ===");
    println!("Samples: {}", dataset.len());
    print_report(&report);

    if let Some(dir) = &args.report_dir {
        write_plots(&report, dir)?;
    }

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<Outcome> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let outcome = interactive::run(&args.model, &mut input, &mut output)?;
    match &outcome {
        Outcome::Predicted(label) => info!("Predicted label {label}"),
        Outcome::Rejected(e) => info!("Prediction attempt rejected: {e}"),
        Outcome::Unavailable(reason) => info!("No prediction made: {reason}"),
    }
    Ok(outcome)
}

fn serve_command(args: ServeArgs) -> Result<()> {
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        model_path: args.model,
        request_timeout: Duration::from_secs(args.timeout_secs),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_server(config))
}

fn info_command(args: InfoArgs) -> Result<()> {
    let serializable = SerializableModel::load_from_file(&args.model)?;
    serializable.print_summary();

    let model = serializable.to_trained_model()?;
    let info = model.info();
    println!("\nTree Details:");
    println!("  Deepest tree: {} levels", info.max_tree_depth);
    println!("  Mean leaves per tree: {:.1}", info.mean_leaves);

    println!("\nFeature Importance:");
    for feature in model.ranked_importances() {
        println!("  {:<18} {:.4}", feature.name, feature.importance);
    }

    Ok(())
}
