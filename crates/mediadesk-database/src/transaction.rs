//! Unit-of-work transactions and the commit pipeline.

use serde::Serialize;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

use mediadesk_core::{AppError, AppResult};
use mediadesk_entity::{AccessContext, EntryKey, EntryTree};

use crate::store::EntryStore;

/// Counts of entries touched by a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Directories committed for the first time.
    pub inserted_directories: usize,
    /// Files processed by the storage hooks.
    pub flushed_files: usize,
    /// Persisted directories whose location changed.
    pub flushed_directories: usize,
    /// Entries removed, descendants included.
    pub removed: usize,
}

/// A unit of work over a private copy of the tree.
///
/// Changes become visible only through [`Transaction::commit`]. Dropping the
/// transaction discards them.
pub struct Transaction<'a> {
    store: &'a EntryStore,
    guard: MutexGuard<'a, EntryTree>,
    working: EntryTree,
    removals: Vec<EntryKey>,
    ctx: AccessContext,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(store: &'a EntryStore, guard: MutexGuard<'a, EntryTree>, ctx: AccessContext) -> Self {
        let working = guard.clone();
        Self {
            store,
            guard,
            working,
            removals: Vec::new(),
            ctx,
        }
    }

    /// The context the transaction acts for.
    pub fn ctx(&self) -> &AccessContext {
        &self.ctx
    }

    /// The working copy.
    pub fn tree(&self) -> &EntryTree {
        &self.working
    }

    /// The working copy, mutable.
    pub fn tree_mut(&mut self) -> &mut EntryTree {
        &mut self.working
    }

    /// Schedule an entry (and for directories its subtree) for deletion.
    pub fn delete(&mut self, key: EntryKey) -> AppResult<()> {
        self.working.ensure_writable(&self.ctx, key)?;
        if !self.removals.contains(&key) {
            self.removals.push(key);
        }
        Ok(())
    }

    /// Discard all changes.
    pub fn rollback(self) {
        debug!(removals = self.removals.len(), "Transaction rolled back");
    }

    /// Run the commit pipeline and publish the working copy.
    ///
    /// Order: path uniqueness, new and moved directories (parents first),
    /// files, a second uniqueness check for names picked during storage,
    /// then removals. Any error leaves the
    /// committed tree untouched.
    pub async fn commit(mut self) -> AppResult<CommitSummary> {
        match self.run_pipeline().await {
            Ok(summary) => {
                self.working.mark_all_committed();
                if let Some(snapshot) = &self.store.snapshot {
                    snapshot.save(&self.working).await?;
                }
                *self.guard = std::mem::take(&mut self.working);
                info!(
                    inserted_directories = summary.inserted_directories,
                    flushed_directories = summary.flushed_directories,
                    flushed_files = summary.flushed_files,
                    removed = summary.removed,
                    "Commit completed"
                );
                Ok(summary)
            }
            Err(e) => {
                warn!(error = %e, "Commit aborted");
                Err(e)
            }
        }
    }

    async fn run_pipeline(&mut self) -> AppResult<CommitSummary> {
        let listener = self.store.listener.clone();
        let mut summary = CommitSummary::default();

        if let Some(path) = self.working.find_path_collision(false) {
            return Err(AppError::duplicate_name(&path));
        }

        let mut directories: Vec<_> = self
            .working
            .directories()
            .filter(|d| !d.meta.persisted || d.meta.location_changed())
            .map(|d| (self.working.depth(d.id), d.id, d.meta.persisted))
            .collect();
        directories.sort();
        for (_, id, persisted) in directories {
            if persisted {
                listener
                    .on_directory_flush(&self.ctx, &mut self.working, id)
                    .await?;
                summary.flushed_directories += 1;
            } else {
                listener
                    .on_directory_insert(&self.ctx, &mut self.working, id)
                    .await?;
                summary.inserted_directories += 1;
            }
        }

        let mut files: Vec<_> = self
            .working
            .files()
            .filter(|f| f.pending.is_some() || (f.meta.persisted && f.meta.location_changed()))
            .map(|f| (f.meta.path.clone(), f.id))
            .collect();
        files.sort();
        for (_, id) in files {
            listener.on_file_flush(&self.ctx, &mut self.working, id).await?;
            summary.flushed_files += 1;
        }

        if let Some(path) = self.working.find_path_collision(true) {
            return Err(AppError::duplicate_name(&path));
        }

        for key in std::mem::take(&mut self.removals) {
            if !self.working.contains(key) {
                continue;
            }
            match key {
                EntryKey::Directory(id) => {
                    listener.on_directory_delete(&self.ctx, &self.working, id).await?
                }
                EntryKey::File(id) => listener.on_file_delete(&self.ctx, &self.working, id).await?,
            }
            summary.removed += self.working.detach(key);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use mediadesk_core::types::{DirId, FileId, UserId};
    use mediadesk_core::ErrorKind;
    use mediadesk_entity::{CommitListener, PendingPayload, PermissionPolicy, Principal};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        fail_on_file: bool,
    }

    impl Recorder {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommitListener for Recorder {
        async fn on_directory_insert(
            &self,
            _ctx: &AccessContext,
            tree: &mut EntryTree,
            id: DirId,
        ) -> AppResult<()> {
            let path = tree.find_directory(id).map(|d| d.meta.path.clone()).unwrap_or_default();
            self.push(format!("insert:{path}"));
            Ok(())
        }

        async fn on_directory_flush(
            &self,
            _ctx: &AccessContext,
            tree: &mut EntryTree,
            id: DirId,
        ) -> AppResult<()> {
            let dir = tree.find_directory(id).unwrap();
            let (_, old) = dir.meta.previous_location();
            self.push(format!("move:{old}->{}", dir.meta.path));
            Ok(())
        }

        async fn on_file_flush(
            &self,
            ctx: &AccessContext,
            tree: &mut EntryTree,
            id: FileId,
        ) -> AppResult<()> {
            if self.fail_on_file {
                return Err(AppError::upload_file(&PathBuf::from("/x"), "disk full"));
            }
            let file = tree.find_file_mut(id).unwrap();
            if file.pending.take().is_some() {
                file.size_bytes = 42;
                // emulate storage choosing a final name
                let name = format!("final-{}", file.meta.name);
                tree.rename(ctx, EntryKey::File(id), &name)?;
            }
            let path = tree.find_file(id).unwrap().meta.path.clone();
            self.push(format!("file:{path}"));
            Ok(())
        }

        async fn on_directory_delete(
            &self,
            _ctx: &AccessContext,
            tree: &EntryTree,
            id: DirId,
        ) -> AppResult<()> {
            self.push(format!("rmdir:{}", tree.find_directory(id).unwrap().meta.path));
            Ok(())
        }

        async fn on_file_delete(
            &self,
            _ctx: &AccessContext,
            tree: &EntryTree,
            id: FileId,
        ) -> AppResult<()> {
            self.push(format!("rm:{}", tree.find_file(id).unwrap().meta.path));
            Ok(())
        }
    }

    fn admin() -> AccessContext {
        AccessContext::new(
            Some(Principal::new(UserId::new(), ["admin"])),
            PermissionPolicy::default(),
        )
    }

    fn upload(name: &str) -> PendingPayload {
        PendingPayload::Upload {
            staged_path: PathBuf::from("/tmp/staged"),
            original_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_commit_orders_hooks_and_clears_transient_state() {
        let recorder = Arc::new(Recorder::default());
        let store = EntryStore::in_memory(recorder.clone());
        let ctx = admin();

        let mut tx = store.begin(ctx.clone()).await;
        let tree = tx.tree_mut();
        let root = tree.create_directory(&ctx, None, "photos").unwrap();
        let child = tree.create_directory(&ctx, Some(root), "trips").unwrap();
        tree.create_file(&ctx, Some(child), upload("a.jpg")).unwrap();
        let summary = tx.commit().await.unwrap();

        assert_eq!(summary.inserted_directories, 2);
        assert_eq!(summary.flushed_files, 1);
        assert_eq!(
            recorder.events(),
            ["insert:photos", "insert:photos/trips", "file:photos/trips/final-a.jpg"]
        );

        let persisted = store
            .read(|tree| {
                tree.directories().all(|d| d.meta.persisted && d.meta.previous_path.is_none())
                    && tree.files().all(|f| f.pending.is_none() && f.size_bytes == 42)
            })
            .await;
        assert!(persisted);
    }

    #[tokio::test]
    async fn test_rename_triggers_directory_flush_parent_first() {
        let recorder = Arc::new(Recorder::default());
        let store = EntryStore::in_memory(recorder.clone());
        let ctx = admin();

        let mut tx = store.begin(ctx.clone()).await;
        let root = tx.tree_mut().create_directory(&ctx, None, "photos").unwrap();
        tx.tree_mut().create_directory(&ctx, Some(root), "trips").unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin(ctx.clone()).await;
        tx.tree_mut().rename(&ctx, root.into(), "images").unwrap();
        let summary = tx.commit().await.unwrap();

        assert_eq!(summary.flushed_directories, 2);
        let events = recorder.events();
        assert_eq!(
            &events[2..],
            ["move:photos->images", "move:photos/trips->images/trips"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_path_rejected_and_state_kept() {
        let store = EntryStore::in_memory(Arc::new(Recorder::default()));
        let ctx = admin();

        let mut tx = store.begin(ctx.clone()).await;
        tx.tree_mut().create_directory(&ctx, None, "docs").unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin(ctx.clone()).await;
        tx.tree_mut().create_directory(&ctx, None, "Docs").unwrap();
        let err = tx.commit().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);

        assert_eq!(store.read(|t| t.len()).await, 1);
    }

    #[tokio::test]
    async fn test_listener_failure_aborts_commit() {
        let recorder = Arc::new(Recorder {
            fail_on_file: true,
            ..Recorder::default()
        });
        let store = EntryStore::in_memory(recorder);
        let ctx = admin();

        let mut tx = store.begin(ctx.clone()).await;
        tx.tree_mut().create_file(&ctx, None, upload("a.txt")).unwrap();
        let err = tx.commit().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UploadFile);
        assert!(store.read(|t| t.is_empty()).await);
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let store = EntryStore::in_memory(Arc::new(Recorder::default()));
        let ctx = admin();
        {
            let mut tx = store.begin(ctx.clone()).await;
            tx.tree_mut().create_directory(&ctx, None, "temp").unwrap();
        }
        assert!(store.read(|t| t.is_empty()).await);
    }

    #[tokio::test]
    async fn test_delete_cascades_after_hooks() {
        let recorder = Arc::new(Recorder::default());
        let store = EntryStore::in_memory(recorder.clone());
        let ctx = admin();

        let mut tx = store.begin(ctx.clone()).await;
        let root = tx.tree_mut().create_directory(&ctx, None, "a").unwrap();
        let sub = tx.tree_mut().create_directory(&ctx, Some(root), "b").unwrap();
        tx.tree_mut().create_file(&ctx, Some(sub), upload("c.txt")).unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin(ctx.clone()).await;
        tx.delete(root.into()).unwrap();
        tx.delete(sub.into()).unwrap();
        let summary = tx.commit().await.unwrap();

        assert_eq!(summary.removed, 3);
        assert_eq!(recorder.events().last().map(String::as_str), Some("rmdir:a"));
        assert!(store.read(|t| t.is_empty()).await);
    }

    #[tokio::test]
    async fn test_delete_requires_write_access() {
        let store = EntryStore::in_memory(Arc::new(Recorder::default()));
        let owner = AccessContext::new(
            Some(Principal::new(UserId::new(), ["member"])),
            PermissionPolicy::default(),
        );
        let mut tx = store.begin(owner.clone()).await;
        let dir = tx.tree_mut().create_directory(&owner, None, "mine").unwrap();
        tx.commit().await.unwrap();

        let stranger = AccessContext::new(
            Some(Principal::new(UserId::new(), ["member"])),
            PermissionPolicy::default(),
        );
        let mut tx = store.begin(stranger).await;
        let err = tx.delete(dir.into()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let config = mediadesk_core::config::DatabaseConfig {
            snapshot_path: Some(tmp.path().join("store.json").display().to_string()),
        };
        let ctx = admin();

        let store = EntryStore::open(&config, Arc::new(Recorder::default())).await.unwrap();
        let mut tx = store.begin(ctx.clone()).await;
        let dir = tx.tree_mut().create_directory(&ctx, None, "kept").unwrap();
        tx.commit().await.unwrap();
        drop(store);

        let reopened = EntryStore::open(&config, Arc::new(Recorder::default())).await.unwrap();
        let (path, persisted) = reopened
            .read(|t| {
                let d = t.find_directory(dir).unwrap();
                (d.meta.path.clone(), d.meta.persisted)
            })
            .await;
        assert_eq!(path, "kept");
        assert!(persisted);
    }
}
