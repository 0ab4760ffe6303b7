//! Unix socket client for the daemon protocol.

use anyhow::{Context, Result};
use siteguard_common::ipc::{Method, Request, Response, ResponseData};
use siteguard_common::paths;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

pub struct RpcClient {
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    writer: tokio::net::unix::OwnedWriteHalf,
}

impl RpcClient {
    /// Connect to the daemon socket, preferring an explicit path over the
    /// discovered default.
    pub async fn connect(socket_path: Option<&Path>) -> Result<Self> {
        let path = socket_path
            .map(Path::to_path_buf)
            .unwrap_or_else(paths::socket_path);

        let stream = UnixStream::connect(&path).await.with_context(|| {
            format!(
                "failed to connect to {} (is siteguardd running?)",
                path.display()
            )
        })?;

        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Send a request and wait for its response.
    pub async fn call(&mut self, method: Method) -> Result<ResponseData> {
        let id = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        let request = Request { id, method };

        let request_json = serde_json::to_string(&request)? + "\n";
        self.writer
            .write_all(request_json.as_bytes())
            .await
            .context("failed to send request")?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .await
            .context("failed to read response")?;

        let response: Response =
            serde_json::from_str(&line).context("failed to parse response")?;
        if response.id != id {
            anyhow::bail!("response id mismatch");
        }

        response
            .result
            .map_err(|e| anyhow::anyhow!("daemon error: {e}"))
    }
}
