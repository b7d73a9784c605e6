// Income Predictor - Web Server
// Serves the prediction form and JSON API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use income_predictor::web::{router, AppState};
use income_predictor::{init_logging, ArtifactPaths, LogConfig, LogFormat, PredictionContext};

#[derive(Parser)]
#[command(name = "income-server", version, about = "Income prediction web form")]
struct ServerArgs {
    /// Directory holding the four artifact files
    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Less logging (-q warnings only, -qq errors only)
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    init_logging(&LogConfig {
        format: args.log_format,
        ..LogConfig::from_verbosity(args.verbose, args.quiet)
    })?;

    // Load artifacts once; every request reads the same context
    let paths = ArtifactPaths::in_dir(&args.artifacts_dir);
    let ctx = PredictionContext::load(&paths)
        .with_context(|| format!("Failed to load artifacts from {:?}", args.artifacts_dir))?;

    let app = router(AppState::new(ctx));

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", args.addr))?;

    tracing::info!(addr = %args.addr, "server running");
    tracing::info!("form: http://{}/  api: http://{}/api/predict", args.addr, args.addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped with an error")?;

    Ok(())
}
