//! siteguard daemon.
//!
//! Aggregates storage, cookie and tracker signals per web origin, maintains
//! rolling counters and trust history, and raises storage-growth alerts.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use siteguardd::config::DaemonConfig;
use siteguardd::feeds::SpoolFeed;
use siteguardd::rpc_server::{self, DaemonState};
use siteguardd::scheduler;
use siteguardd::store::StoreHandle;

#[derive(Parser)]
#[command(name = "siteguardd")]
#[command(about = "siteguard - per-site privacy telemetry daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to siteguardd.toml (defaults to the XDG config location).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the state directory.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Override the socket path.
    #[arg(long)]
    socket: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(DaemonConfig::default_path);
    let mut config = DaemonConfig::load(&config_path)?;
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }
    if let Some(socket) = cli.socket {
        config.socket_path = socket;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone())),
        )
        .init();

    info!("siteguardd v{} starting", env!("CARGO_PKG_VERSION"));
    info!("state dir: {}", config.state_dir.display());

    let store = StoreHandle::new(&config.state_dir);

    // Write the document back once so the first client sees defaults.
    let initial = store.load().await?;
    store.save(&initial).await?;

    let spool = Arc::new(SpoolFeed::new(&config.state_dir));
    let state = Arc::new(DaemonState {
        store,
        feed: spool.clone(),
        cookies: spool.clone(),
        pages: spool,
    });

    scheduler::spawn_snapshot_scheduler(Arc::clone(&state));
    scheduler::spawn_daily_report_scheduler(Arc::clone(&state));

    rpc_server::start_server(&config.socket_path, state).await
}
