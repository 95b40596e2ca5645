//! The entry store.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use mediadesk_core::config::DatabaseConfig;
use mediadesk_core::AppResult;
use mediadesk_entity::{AccessContext, CommitListener, EntryTree};

use crate::snapshot::SnapshotFile;
use crate::transaction::Transaction;

/// Holds the committed entry tree.
///
/// Transactions take the store lock for their whole lifetime, so within one
/// process commits are serialized and a concurrent rename of the same entry
/// simply waits for the previous one to finish.
pub struct EntryStore {
    pub(crate) state: Mutex<EntryTree>,
    pub(crate) listener: Arc<dyn CommitListener>,
    pub(crate) snapshot: Option<SnapshotFile>,
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl EntryStore {
    /// Create an empty, non-persistent store.
    pub fn in_memory(listener: Arc<dyn CommitListener>) -> Self {
        Self {
            state: Mutex::new(EntryTree::new()),
            listener,
            snapshot: None,
        }
    }

    /// Open a store according to configuration, loading the snapshot if one
    /// is configured.
    pub async fn open(config: &DatabaseConfig, listener: Arc<dyn CommitListener>) -> AppResult<Self> {
        let Some(path) = &config.snapshot_path else {
            info!("Entry store running in memory only");
            return Ok(Self::in_memory(listener));
        };

        let snapshot = SnapshotFile::new(path);
        let tree = snapshot.load().await?;
        Ok(Self {
            state: Mutex::new(tree),
            listener,
            snapshot: Some(snapshot),
        })
    }

    /// Start a unit of work on behalf of `ctx`.
    pub async fn begin(&self, ctx: AccessContext) -> Transaction<'_> {
        let guard = self.state.lock().await;
        Transaction::new(self, guard, ctx)
    }

    /// Run a read-only closure against the committed tree.
    pub async fn read<R>(&self, f: impl FnOnce(&EntryTree) -> R) -> R {
        let guard = self.state.lock().await;
        f(&guard)
    }
}
