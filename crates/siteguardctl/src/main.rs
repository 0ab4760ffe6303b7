//! siteguard control - CLI client for the siteguard daemon.
//!
//! The dashboard stand-in: inspects tracked sites and drives user actions
//! over the daemon's unix socket.

mod commands;
mod rpc_client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "siteguardctl")]
#[command(about = "siteguard - per-site privacy telemetry", long_about = None)]
#[command(version)]
struct Cli {
    /// Socket path (defaults to $SITEGUARD_SOCKET or the runtime dir).
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon and store status
    Status,

    /// List tracked sites by ascending trust
    Sites {
        /// Show at most this many sites
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show one site in detail, including recent history
    Site { origin: String },

    /// Run a snapshot cycle now
    Snapshot,

    /// Exclude a hostname from tracking (or include it again)
    Exclude {
        hostname: String,

        /// Remove the exclusion instead of adding it
        #[arg(long)]
        remove: bool,
    },

    /// Set the storage-growth alert threshold for an origin, in KB
    Threshold { origin: String, threshold_kb: u64 },

    /// Clear accumulated data for an origin
    Clear { origin: String },

    /// Refresh cookie metrics for an origin
    Cookies { origin: String },

    /// Configure the daily report
    Report {
        /// Turn the daily report on or off
        #[arg(long)]
        enabled: Option<bool>,

        /// Local hour (0-23) the report fires
        #[arg(long)]
        hour: Option<u32>,
    },

    /// Dump the raw store document as JSON
    State,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let socket = cli.socket;
    let socket = socket.as_deref();

    match cli.command {
        Commands::Status => commands::status(socket).await,
        Commands::Sites { limit } => commands::sites(socket, limit).await,
        Commands::Site { origin } => commands::site(socket, origin).await,
        Commands::Snapshot => commands::snapshot(socket).await,
        Commands::Exclude { hostname, remove } => commands::exclude(socket, hostname, remove).await,
        Commands::Threshold {
            origin,
            threshold_kb,
        } => commands::threshold(socket, origin, threshold_kb).await,
        Commands::Clear { origin } => commands::clear(socket, origin).await,
        Commands::Cookies { origin } => commands::cookies(socket, origin).await,
        Commands::Report { enabled, hour } => commands::report(socket, enabled, hour).await,
        Commands::State => commands::state(socket).await,
    }
}
