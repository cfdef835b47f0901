use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracker_common::observability::init_logging;
use tracker_config::{TrackerConfig, TrackerConfigLoader};
use wiring::build_from_config;
mod wiring;

const DEFAULT_CONFIG: &str = "tracker.yaml";

/// Record the "% of retail investors lose money" disclosure of broker sites.
#[derive(Debug, Parser)]
#[command(name = "cfd-tracker", version)]
struct Args {
    /// YAML configuration file. Without it, `tracker.yaml` is used when present.
    #[arg(short, long, env = "TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Skip mailing the ledger after this run.
    #[arg(long)]
    no_notify: bool,

    /// Open browser sessions on the remote WebDriver endpoint.
    #[arg(long)]
    containerized: bool,

    /// Append to this ledger file instead of the configured one.
    #[arg(long)]
    ledger: Option<PathBuf>,
}

impl Args {
    fn apply(&self, cfg: &mut TrackerConfig) {
        if self.containerized {
            cfg.browser.containerized = true;
        }
        if let Some(path) = &self.ledger {
            cfg.ledger.path = path.clone();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins)
    let loader = match &args.config {
        Some(path) => TrackerConfigLoader::new().with_file(path),
        None => TrackerConfigLoader::new().with_optional_file(DEFAULT_CONFIG),
    };
    let mut cfg = loader.load()?;
    args.apply(&mut cfg);

    // 2) Logging
    let log_path = init_logging(cfg.logging.to_log_config())?;
    info!(log = %log_path.display(), "cfd-tracker starting");

    // 3) Run
    let orchestrator = build_from_config(&cfg, !args.no_notify)?;
    let summary = orchestrator.run(Local::now().date_naive()).await?;

    info!(
        ledger = %orchestrator.ledger().path().display(),
        "{}",
        summary.headline()
    );
    Ok(())
}
