use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;

use income_predictor::{
    init_logging, score_csv, ArtifactPaths, CategoricalFeature, LogConfig, LogFormat, ModelKind,
    PredictionContext, UserInput,
};

#[derive(Parser)]
#[command(
    name = "income-predict",
    version,
    about = "Predict income level (<=50K / >50K) from pre-fitted KNN and decision-tree artifacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    artifacts: ArtifactArgs,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less logging (-q warnings only, -qq errors only)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "compact", global = true)]
    log_format: LogFormat,
}

#[derive(Args, Clone)]
struct ArtifactArgs {
    /// Directory holding the four artifact files
    #[arg(long, default_value = "artifacts", global = true)]
    artifacts_dir: PathBuf,

    /// Override the label encoders file
    #[arg(long, global = true)]
    encoders: Option<PathBuf>,

    /// Override the scaler file
    #[arg(long, global = true)]
    scaler: Option<PathBuf>,

    /// Override the KNN model file
    #[arg(long, global = true)]
    knn: Option<PathBuf>,

    /// Override the decision tree model file
    #[arg(long, global = true)]
    decision_tree: Option<PathBuf>,
}

impl ArtifactArgs {
    fn paths(&self) -> ArtifactPaths {
        let mut paths = ArtifactPaths::in_dir(&self.artifacts_dir);
        if let Some(p) = &self.encoders {
            paths.encoders = p.clone();
        }
        if let Some(p) = &self.scaler {
            paths.scaler = p.clone();
        }
        if let Some(p) = &self.knn {
            paths.knn = p.clone();
        }
        if let Some(p) = &self.decision_tree {
            paths.decision_tree = p.clone();
        }
        paths
    }
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate the artifacts, then print their fingerprints
    Check,

    /// List each categorical feature's classes and codes
    Features,

    /// Predict a single record
    Predict(PredictArgs),

    /// Score every row of a CSV file
    Batch(BatchArgs),
}

#[derive(Args)]
struct PredictArgs {
    /// knn or decision_tree
    #[arg(long, default_value = "knn")]
    model: ModelKind,

    #[arg(long)]
    age: i64,
    #[arg(long)]
    workclass: String,
    #[arg(long)]
    education: String,
    #[arg(long)]
    marital_status: String,
    #[arg(long)]
    occupation: String,
    #[arg(long)]
    relationship: String,
    #[arg(long)]
    race: String,
    #[arg(long)]
    sex: String,
    #[arg(long)]
    hours_per_week: i64,
}

#[derive(Args)]
struct BatchArgs {
    /// knn or decision_tree
    #[arg(long, default_value = "knn")]
    model: ModelKind,

    /// Input CSV with adult dataset column names
    #[arg(long)]
    input: PathBuf,

    /// Output CSV (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        format: cli.log_format,
        ..LogConfig::from_verbosity(cli.verbose, cli.quiet)
    };
    init_logging(&log_config)?;

    let paths = cli.artifacts.paths();
    let ctx = PredictionContext::load(&paths)
        .with_context(|| format!("Failed to load artifacts from {:?}", cli.artifacts.artifacts_dir))?;

    match cli.command {
        Command::Check => run_check(&ctx),
        Command::Features => run_features(&ctx),
        Command::Predict(args) => run_predict(&ctx, args),
        Command::Batch(args) => run_batch(&ctx, args),
    }
}

fn run_check(ctx: &PredictionContext) -> Result<()> {
    println!("✓ Artifacts valid (loaded {})", ctx.manifest().loaded_at.to_rfc3339());
    for info in &ctx.manifest().artifacts {
        println!("  {:<15} {}  {}", info.name, info.sha256, info.path.display());
    }
    Ok(())
}

fn run_features(ctx: &PredictionContext) -> Result<()> {
    for feature in CategoricalFeature::ALL {
        println!("{} ({})", feature.label(), feature.artifact_key());
        for (code, class) in ctx.categories(feature).iter().enumerate() {
            println!("  {:>3}  {}", code, class);
        }
    }
    Ok(())
}

fn run_predict(ctx: &PredictionContext, args: PredictArgs) -> Result<()> {
    let input = UserInput {
        age: args.age,
        workclass: args.workclass,
        education: args.education,
        marital_status: args.marital_status,
        occupation: args.occupation,
        relationship: args.relationship,
        race: args.race,
        sex: args.sex,
        hours_per_week: args.hours_per_week,
    };

    let prediction = ctx
        .predict(&input, args.model)
        .map_err(|e| anyhow!("❌ {}", e.user_message()))?;
    println!("{}", prediction.line());
    Ok(())
}

fn run_batch(ctx: &PredictionContext, args: BatchArgs) -> Result<()> {
    let reader = File::open(&args.input)
        .with_context(|| format!("Failed to open input CSV: {:?}", args.input))?;

    let summary = match &args.output {
        Some(path) => {
            let writer = File::create(path)
                .with_context(|| format!("Failed to create output CSV: {:?}", path))?;
            score_csv(ctx, args.model, reader, writer)?
        }
        None => score_csv(ctx, args.model, reader, io::stdout().lock())?,
    };

    eprintln!(
        "✓ Scored {}/{} rows ({} >50K, {} failed)",
        summary.scored, summary.rows, summary.above_50k, summary.failed
    );
    Ok(())
}
