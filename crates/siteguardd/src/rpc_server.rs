//! IPC server - unix socket for daemon-client communication.
//!
//! Line-delimited JSON: one request per line, one response per line. Every
//! connection gets its own task; handler failures become error results on
//! the wire, never a dead daemon.

use anyhow::{Context, Result};
use siteguard_common::ipc::Request;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info, warn};

use crate::feeds::{CookieSource, PageBroadcast, TrackerFeed};
use crate::handlers;
use crate::store::StoreHandle;

/// Daemon state shared across connections and schedulers.
pub struct DaemonState {
    pub store: StoreHandle,
    pub feed: Arc<dyn TrackerFeed>,
    pub cookies: Arc<dyn CookieSource>,
    pub pages: Arc<dyn PageBroadcast>,
}

/// Bind the socket and serve forever.
pub async fn start_server(socket_path: &Path, state: Arc<DaemonState>) -> Result<()> {
    if let Some(dir) = socket_path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .context("failed to create socket directory")?;
    }

    // Remove a stale socket from a previous run.
    let _ = tokio::fs::remove_file(socket_path).await;

    let listener = UnixListener::bind(socket_path).context("failed to bind unix socket")?;
    info!("ipc server listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, state).await {
                        error!("connection handler error: {e:#}");
                    }
                });
            }
            Err(e) => {
                error!("failed to accept connection: {e}");
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(stream: UnixStream, state: Arc<DaemonState>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .context("failed to read from socket")?;

        if bytes_read == 0 {
            // Connection closed.
            break;
        }

        let request: Request = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!("invalid request json: {e}");
                continue;
            }
        };

        let response = handlers::handle_request(request, &state).await;

        let response_json = serde_json::to_string(&response)? + "\n";
        writer
            .write_all(response_json.as_bytes())
            .await
            .context("failed to write response")?;
    }

    Ok(())
}
