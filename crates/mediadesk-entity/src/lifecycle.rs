//! Commit pipeline notifications.
//!
//! The persistence layer calls a [`CommitListener`] at fixed points of every
//! commit so physical storage can follow logical changes without the
//! entities performing any I/O themselves.

use async_trait::async_trait;

use mediadesk_core::types::{DirId, FileId};
use mediadesk_core::AppResult;

use crate::permission::AccessContext;
use crate::tree::EntryTree;

/// Receives entry lifecycle events during a commit.
///
/// Every hook runs before the commit becomes visible; an error aborts the
/// commit and the logical changes are discarded.
#[async_trait]
pub trait CommitListener: Send + Sync {
    /// A directory is committed for the first time.
    async fn on_directory_insert(
        &self,
        ctx: &AccessContext,
        tree: &mut EntryTree,
        id: DirId,
    ) -> AppResult<()>;

    /// An already persisted directory is about to be committed.
    async fn on_directory_flush(
        &self,
        ctx: &AccessContext,
        tree: &mut EntryTree,
        id: DirId,
    ) -> AppResult<()>;

    /// A file (new or persisted) is about to be committed. May rename the
    /// file while adopting its pending payload.
    async fn on_file_flush(
        &self,
        ctx: &AccessContext,
        tree: &mut EntryTree,
        id: FileId,
    ) -> AppResult<()>;

    /// A directory and its whole subtree are about to be deleted.
    async fn on_directory_delete(
        &self,
        ctx: &AccessContext,
        tree: &EntryTree,
        id: DirId,
    ) -> AppResult<()>;

    /// A single file is about to be deleted.
    async fn on_file_delete(
        &self,
        ctx: &AccessContext,
        tree: &EntryTree,
        id: FileId,
    ) -> AppResult<()>;
}
