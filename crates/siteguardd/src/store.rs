//! Store persistence.
//!
//! The whole aggregation state is one JSON document read and written
//! wholesale. Handlers and the snapshot cycle go through
//! [`StoreHandle::with_transaction`].

use anyhow::{Context, Result};
use siteguard_common::store::{Store, STORE_FILE};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Handle on the persisted store document.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    path: PathBuf,
}

impl StoreHandle {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(STORE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, or the defaults when none exists yet.
    pub async fn load(&self) -> Result<Store> {
        if !self.path.exists() {
            info!(
                "no store document at {}, starting from defaults",
                self.path.display()
            );
            return Ok(Store::default());
        }
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .context("failed to read store document")?;
        let store: Store =
            serde_json::from_str(&contents).context("failed to parse store document")?;
        Ok(store)
    }

    /// Save the document.
    ///
    /// The write goes through a temp file and rename so a crash mid-write
    /// cannot leave a torn document. This does not serialize concurrent
    /// transactions; see [`StoreHandle::with_transaction`].
    pub async fn save(&self, store: &Store) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .context("failed to create state directory")?;
        }
        let json = serde_json::to_string_pretty(store).context("failed to serialize store")?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .context("failed to create store temp file")?;
        file.write_all(json.as_bytes())
            .await
            .context("failed to write store document")?;
        file.sync_all().await.context("failed to sync store document")?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .context("failed to move store document into place")?;

        debug!("saved store document ({} bytes)", json.len());
        Ok(())
    }

    /// Load the full document, mutate it in memory, save it back.
    ///
    /// The caller sees one logical step, but nothing serializes two
    /// interleaved transactions: both load, both mutate, and the later save
    /// wins, silently dropping the earlier changes. Last-write-wins is the
    /// documented behavior of this store; true cross-call atomicity would
    /// require a lock or a compare-and-swap backing store.
    ///
    /// An error from the mutator aborts the transaction before the save, so
    /// nothing is persisted.
    pub async fn with_transaction<T, F>(&self, mutator: F) -> Result<T>
    where
        F: FnOnce(&mut Store) -> Result<T>,
    {
        let mut store = self.load().await?;
        let out = mutator(&mut store)?;
        self.save(&store).await?;
        Ok(out)
    }
}
