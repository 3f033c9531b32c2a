//! pashud - PashuSuchak prediction relay
//!
//! Serves `POST /predict/` and the status endpoints.

use anyhow::{Context, Result};
use clap::Parser;
use pashu_shared::knowledge::load_knowledge;
use pashud::{server, AppState, Config, PredictionOrchestrator, Services};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pashud")]
#[command(about = "PashuSuchak cattle breed prediction relay", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (overrides $PASHU_CONFIG and the default locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("pashud v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    for key in config.missing_credentials() {
        warn!("{} is not set, the matching service will report unconfigured", key);
    }

    if let Some(parent) = config.knowledge.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create knowledge dir {}", parent.display())
            })?;
        }
    }
    let knowledge = load_knowledge(&config.knowledge.path);

    let services = Services::from_config(&config)?;
    let orchestrator = PredictionOrchestrator::new(&config, services, &knowledge)?;
    info!(
        "Scratch dir {}, {} knowledge chunks",
        config.uploads.scratch_dir.display(),
        orchestrator.knowledge_chunks()
    );

    server::run(
        AppState::new(orchestrator),
        &config.server.bind,
        config.server.max_upload_bytes,
    )
    .await
}
