//! JSON snapshot persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mediadesk_core::{AppError, AppResult, ErrorKind};
use mediadesk_entity::{Directory, EntryTree, File};

/// On-disk representation of a committed tree.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    directories: Vec<Directory>,
    files: Vec<File>,
}

/// A JSON file holding the committed entry tree.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Create a handle for the snapshot at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the tree, or an empty tree when no snapshot exists yet.
    pub async fn load(&self) -> AppResult<EntryTree> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            info!(path = %self.path.display(), "No snapshot found, starting with an empty store");
            return Ok(EntryTree::new());
        }

        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read snapshot '{}'", self.path.display()),
                e,
            )
        })?;
        let snapshot: Snapshot = serde_json::from_slice(&raw)?;

        info!(
            path = %self.path.display(),
            directories = snapshot.directories.len(),
            files = snapshot.files.len(),
            "Snapshot loaded"
        );
        Ok(EntryTree::from_entries(snapshot.directories, snapshot.files))
    }

    /// Persist the tree, replacing the previous snapshot atomically.
    pub async fn save(&self, tree: &EntryTree) -> AppResult<()> {
        let mut directories: Vec<Directory> = tree.directories().cloned().collect();
        directories.sort_by(|a, b| a.meta.path.cmp(&b.meta.path));
        let mut files: Vec<File> = tree.files().cloned().collect();
        files.sort_by(|a, b| a.meta.path.cmp(&b.meta.path));

        let raw = serde_json::to_vec_pretty(&Snapshot { directories, files })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = raw.len(), "Snapshot written");
        Ok(())
    }
}
