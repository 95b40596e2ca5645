//! Entry CRUD, permission management and drag-and-drop moves.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use mediadesk_core::types::{DirId, UserId};
use mediadesk_core::{AppError, AppResult};
use mediadesk_database::{CommitSummary, EntryStore};
use mediadesk_entity::{DropMode, EntryKey, EntryMeta, EntryTree};

use crate::context::RequestContext;

/// Request to create a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectoryRequest {
    /// Parent directory, `None` for the tree root.
    pub parent_id: Option<DirId>,
    /// Display name; the path segment is derived from it.
    pub name: String,
}

/// Partial update of an entry. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    /// New display name.
    pub name: Option<String>,
    /// Hide or show in listings.
    pub invisible: Option<bool>,
    /// Move between the public and protected root.
    pub protected: Option<bool>,
    /// Roles to add to the read grants.
    #[serde(default)]
    pub read_grants: Vec<String>,
    /// Roles to add to the write grants.
    #[serde(default)]
    pub write_grants: Vec<String>,
    /// Copy the resulting protection and grants to every descendant.
    #[serde(default)]
    pub propagate: bool,
}

/// Drag-and-drop move of `source` relative to `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// The dragged entry.
    pub source: EntryKey,
    /// The entry it was dropped on.
    pub target: EntryKey,
    /// Placement relative to the target.
    pub mode: DropMode,
}

/// A committed entry as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    /// Typed key of the entry.
    pub key: EntryKey,
    /// Shared attributes.
    #[serde(flatten)]
    pub meta: EntryMeta,
    /// Stored payload size, files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Detected MIME type, files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl EntryInfo {
    /// Snapshot an entry from `tree`.
    pub fn from_tree(tree: &EntryTree, key: EntryKey) -> AppResult<Self> {
        match key {
            EntryKey::Directory(id) => {
                let dir = tree
                    .find_directory(id)
                    .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
                Ok(Self {
                    key,
                    meta: dir.meta.clone(),
                    size_bytes: None,
                    mime_type: None,
                })
            }
            EntryKey::File(id) => {
                let file = tree
                    .find_file(id)
                    .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
                Ok(Self {
                    key,
                    meta: file.meta.clone(),
                    size_bytes: Some(file.size_bytes),
                    mime_type: file.mime_type.clone(),
                })
            }
        }
    }
}

/// Manages directory and file metadata.
#[derive(Debug, Clone)]
pub struct EntryService {
    /// Entry store.
    store: Arc<EntryStore>,
}

impl EntryService {
    /// Creates a new entry service.
    pub fn new(store: Arc<EntryStore>) -> Self {
        Self { store }
    }

    /// Gets an entry, checking read access.
    pub async fn get(&self, ctx: &RequestContext, key: EntryKey) -> AppResult<EntryInfo> {
        let access = ctx.access();
        self.store
            .read(|tree| {
                tree.read_meta(&access, key)?;
                EntryInfo::from_tree(tree, key)
            })
            .await
    }

    /// Display names of a directory and its ancestors, e.g. `Photos/2024`.
    pub async fn display_path(&self, ctx: &RequestContext, id: DirId) -> AppResult<String> {
        let access = ctx.access();
        self.store.read(|tree| tree.display_path(&access, id)).await
    }

    /// Creates a directory. It inherits protection and grants from its
    /// parent and is created in both storage roots.
    pub async fn create_directory(
        &self,
        ctx: &RequestContext,
        req: CreateDirectoryRequest,
    ) -> AppResult<EntryInfo> {
        let access = ctx.access();
        let mut tx = self.store.begin(access.clone()).await;
        let id = tx
            .tree_mut()
            .create_directory(&access, req.parent_id, &req.name)?;
        tx.commit().await?;

        let info = self.committed(EntryKey::Directory(id)).await?;
        info!(
            user_id = ?ctx.user_id(),
            dir_id = %id,
            path = %info.meta.path,
            "Directory created"
        );
        Ok(info)
    }

    /// Applies a partial update to an entry.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        key: EntryKey,
        req: UpdateEntryRequest,
    ) -> AppResult<EntryInfo> {
        let access = ctx.access();
        let mut tx = self.store.begin(access.clone()).await;
        let tree = tx.tree_mut();

        if let Some(name) = &req.name {
            tree.rename(&access, key, name)?;
        }
        if let Some(invisible) = req.invisible {
            tree.set_invisible(&access, key, invisible)?;
        }
        if let Some(protected) = req.protected {
            tree.set_protected(&access, key, protected)?;
        }
        for role in &req.read_grants {
            tree.add_read_grant(&access, key, role)?;
        }
        for role in &req.write_grants {
            tree.add_write_grant(&access, key, role)?;
        }
        if req.propagate {
            let id = key
                .as_directory()
                .ok_or_else(|| AppError::validation("Only directories can propagate permissions"))?;
            tree.propagate_recursively(&access, id)?;
        }

        let summary = tx.commit().await?;
        info!(
            user_id = ?ctx.user_id(),
            key = %key,
            flushed_directories = summary.flushed_directories,
            flushed_files = summary.flushed_files,
            "Entry updated"
        );
        self.committed(key).await
    }

    /// Changes or clears the author of an entry.
    pub async fn set_author(
        &self,
        ctx: &RequestContext,
        key: EntryKey,
        author: Option<UserId>,
    ) -> AppResult<EntryInfo> {
        let access = ctx.access();
        let mut tx = self.store.begin(access.clone()).await;
        tx.tree_mut().set_author(&access, key, author)?;
        tx.commit().await?;
        self.committed(key).await
    }

    /// Copies protection and grants from `source` onto `key`. Without a
    /// source the entry's parent is used.
    pub async fn copy_permission(
        &self,
        ctx: &RequestContext,
        key: EntryKey,
        source: Option<EntryKey>,
    ) -> AppResult<EntryInfo> {
        let access = ctx.access();
        let mut tx = self.store.begin(access.clone()).await;
        tx.tree_mut().copy_permission(&access, key, source)?;
        tx.commit().await?;
        self.committed(key).await
    }

    /// Copies a directory's protection and grants to its whole subtree.
    pub async fn propagate(&self, ctx: &RequestContext, id: DirId) -> AppResult<CommitSummary> {
        let access = ctx.access();
        let mut tx = self.store.begin(access.clone()).await;
        tx.tree_mut().propagate_recursively(&access, id)?;
        let summary = tx.commit().await?;
        info!(dir_id = %id, files = summary.flushed_files, "Permissions propagated");
        Ok(summary)
    }

    /// Deletes an entry; directories are removed with their subtree.
    pub async fn delete(&self, ctx: &RequestContext, key: EntryKey) -> AppResult<CommitSummary> {
        let mut tx = self.store.begin(ctx.access()).await;
        tx.delete(key)?;
        let summary = tx.commit().await?;
        info!(
            user_id = ?ctx.user_id(),
            key = %key,
            removed = summary.removed,
            "Entry deleted"
        );
        Ok(summary)
    }

    /// Reparents the dragged entry. `into` makes the target the new parent;
    /// `before` and `after` place the entry next to the target, so only the
    /// target's parent matters.
    pub async fn move_entry(&self, ctx: &RequestContext, req: MoveRequest) -> AppResult<EntryInfo> {
        let access = ctx.access();
        let mut tx = self.store.begin(access.clone()).await;
        let tree = tx.tree_mut();

        let parent = match req.mode {
            DropMode::Into => Some(req.target.as_directory().ok_or_else(|| {
                AppError::validation("Entries can only be dropped into a directory")
            })?),
            DropMode::Before | DropMode::After => tree.read_meta(&access, req.target)?.parent_id,
        };
        tree.set_parent(&access, req.source, parent)?;

        let summary = tx.commit().await?;
        info!(
            source = %req.source,
            target = %req.target,
            mode = ?req.mode,
            flushed_files = summary.flushed_files,
            "Entry moved"
        );
        self.committed(req.source).await
    }

    async fn committed(&self, key: EntryKey) -> AppResult<EntryInfo> {
        self.store.read(|tree| EntryInfo::from_tree(tree, key)).await
    }
}
