//! Collaborator seams.
//!
//! The blocking layer, cookie snapshots and in-page storage clearing live
//! outside this engine. Each is a trait with a spool-file implementation
//! (files dropped into the state dir by the out-of-process collectors) and a
//! fixed-response fake for tests. Callers treat every failure as an empty
//! result, so a snapshot cycle or clear action still completes with partial
//! data.

use anyhow::{Context, Result};
use async_trait::async_trait;
use siteguard_common::attribution::RuleMatch;
use siteguard_common::cookies::Cookie;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Source of network-rule match events.
#[async_trait]
pub trait TrackerFeed: Send + Sync {
    /// Matches recorded at or after `since_ms`.
    async fn matches_since(&self, since_ms: i64) -> Result<Vec<RuleMatch>>;

    /// Current browsing-context side table (context id -> top-level origin),
    /// maintained by the navigation watcher. Read contract only.
    async fn context_table(&self) -> Result<HashMap<u64, String>>;
}

/// Source of per-origin cookie snapshots.
#[async_trait]
pub trait CookieSource: Send + Sync {
    async fn cookies_for(&self, origin: &str) -> Result<Vec<Cookie>>;
}

/// Outbound fire-and-forget directives to page contexts.
#[async_trait]
pub trait PageBroadcast: Send + Sync {
    /// Ask any open page on `origin` to clear its local storage. Best
    /// effort; callers log and move on when this fails.
    async fn clear_storage(&self, origin: &str) -> Result<()>;
}

/// Spool-file backed collaborators rooted in the daemon state directory.
#[derive(Debug, Clone)]
pub struct SpoolFeed {
    dir: PathBuf,
}

impl SpoolFeed {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            dir: state_dir.join("spool"),
        }
    }
}

#[async_trait]
impl TrackerFeed for SpoolFeed {
    async fn matches_since(&self, since_ms: i64) -> Result<Vec<RuleMatch>> {
        let path = self.dir.join("matches.jsonl");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("failed to read match spool")?;

        let mut matches = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<RuleMatch>(line) {
                Ok(m) if m.ts >= since_ms => matches.push(m),
                Ok(_) => {}
                Err(e) => warn!("skipping malformed match spool line: {e}"),
            }
        }
        Ok(matches)
    }

    async fn context_table(&self) -> Result<HashMap<u64, String>> {
        let path = self.dir.join("contexts.json");
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("failed to read context table")?;
        let table = serde_json::from_str(&contents).context("failed to parse context table")?;
        Ok(table)
    }
}

#[async_trait]
impl CookieSource for SpoolFeed {
    async fn cookies_for(&self, origin: &str) -> Result<Vec<Cookie>> {
        let path = self.dir.join("cookies.json");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("failed to read cookie snapshot")?;
        let mut by_origin: BTreeMap<String, Vec<Cookie>> =
            serde_json::from_str(&contents).context("failed to parse cookie snapshot")?;
        Ok(by_origin.remove(origin).unwrap_or_default())
    }
}

#[async_trait]
impl PageBroadcast for SpoolFeed {
    async fn clear_storage(&self, origin: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .context("failed to create spool directory")?;

        let directive = serde_json::json!({
            "type": "clear_storage",
            "origin": origin,
            "ts": siteguard_common::now_ms(),
        });
        let line = serde_json::to_string(&directive)? + "\n";

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join("outbox.jsonl"))
            .await
            .context("failed to open outbox")?;
        file.write_all(line.as_bytes())
            .await
            .context("failed to write outbox directive")?;
        Ok(())
    }
}

/// Fixed-response collaborators for tests. Mirrors the spool feed's surface
/// without touching the filesystem.
#[derive(Debug, Default)]
pub struct FakeCollaborators {
    pub matches: Vec<RuleMatch>,
    pub contexts: HashMap<u64, String>,
    pub cookies: HashMap<String, Vec<Cookie>>,
    pub cleared: std::sync::Mutex<Vec<String>>,
    /// When set, feed reads fail to exercise the degraded paths.
    pub fail_feed: bool,
}

#[async_trait]
impl TrackerFeed for FakeCollaborators {
    async fn matches_since(&self, since_ms: i64) -> Result<Vec<RuleMatch>> {
        if self.fail_feed {
            anyhow::bail!("feed unavailable");
        }
        Ok(self
            .matches
            .iter()
            .filter(|m| m.ts >= since_ms)
            .cloned()
            .collect())
    }

    async fn context_table(&self) -> Result<HashMap<u64, String>> {
        if self.fail_feed {
            anyhow::bail!("context table unavailable");
        }
        Ok(self.contexts.clone())
    }
}

#[async_trait]
impl CookieSource for FakeCollaborators {
    async fn cookies_for(&self, origin: &str) -> Result<Vec<Cookie>> {
        Ok(self.cookies.get(origin).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PageBroadcast for FakeCollaborators {
    async fn clear_storage(&self, origin: &str) -> Result<()> {
        self.cleared.lock().unwrap().push(origin.to_string());
        Ok(())
    }
}
