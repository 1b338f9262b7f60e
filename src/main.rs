//! pvdash - solar PV generation dashboard

use std::path::PathBuf;

use clap::Parser;
use pvdash::config::{DashboardConfig, LiveMode};

#[derive(Parser)]
#[command(name = "pvdash")]
#[command(about = "Solar PV generation dashboard: forecast, weather and live output")]
#[command(version)]
struct Cli {
    /// YAML configuration file. Defaults are used for anything it leaves out.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `pvdash=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,

    /// Replay the live feed row by row instead of re-fetching it.
    #[arg(long)]
    reveal: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = match &cli.log {
        Some(directives) => tracing_subscriber::EnvFilter::new(directives),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut cfg = match &cli.config {
        Some(path) => match DashboardConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "invalid configuration");
                std::process::exit(2);
            }
        },
        None => DashboardConfig::default(),
    };
    if cli.reveal {
        cfg.live.mode = LiveMode::Reveal;
    }

    tracing::info!(title = %cfg.title, "starting dashboard");
    if let Err(e) = pvdash::run_dashboard(cfg) {
        tracing::error!(error = %e, "dashboard window failed");
        std::process::exit(1);
    }
}
