//! Physical reconciliation of committed entry changes.
//!
//! Every filesystem step is followed by a check of the expected end state;
//! a violated check raises the matching `*Directory`/`*File` error kind and
//! aborts the commit. Nothing is retried.

mod directory;
mod file;

use std::sync::Arc;

use async_trait::async_trait;

use mediadesk_core::types::{DirId, FileId};
use mediadesk_core::AppResult;
use mediadesk_entity::{AccessContext, CommitListener, EntryTree};

use crate::image_cache::ImageCacheResolver;
use crate::roots::StorageRoots;

/// Mirrors logical entry changes onto the public and protected roots.
#[derive(Debug, Clone)]
pub struct StorageSynchronizer {
    roots: StorageRoots,
    images: Arc<ImageCacheResolver>,
}

impl StorageSynchronizer {
    /// Create a synchronizer over `roots` that purges derivatives from `images`.
    pub fn new(roots: StorageRoots, images: Arc<ImageCacheResolver>) -> Self {
        Self { roots, images }
    }

    /// The storage roots.
    pub fn roots(&self) -> &StorageRoots {
        &self.roots
    }
}

#[async_trait]
impl CommitListener for StorageSynchronizer {
    async fn on_directory_insert(
        &self,
        _ctx: &AccessContext,
        tree: &mut EntryTree,
        id: DirId,
    ) -> AppResult<()> {
        self.create_directory(tree, id).await
    }

    async fn on_directory_flush(
        &self,
        _ctx: &AccessContext,
        tree: &mut EntryTree,
        id: DirId,
    ) -> AppResult<()> {
        self.reconcile_directory(tree, id).await
    }

    async fn on_file_flush(
        &self,
        ctx: &AccessContext,
        tree: &mut EntryTree,
        id: FileId,
    ) -> AppResult<()> {
        let has_payload = tree.find_file(id).is_some_and(|f| f.pending.is_some());
        if has_payload {
            self.adopt_payload(ctx, tree, id).await
        } else {
            self.move_file(tree, id).await
        }
    }

    async fn on_directory_delete(
        &self,
        _ctx: &AccessContext,
        tree: &EntryTree,
        id: DirId,
    ) -> AppResult<()> {
        self.remove_directory_tree(tree, id).await
    }

    async fn on_file_delete(
        &self,
        _ctx: &AccessContext,
        tree: &EntryTree,
        id: FileId,
    ) -> AppResult<()> {
        self.remove_file(tree, id).await
    }
}
