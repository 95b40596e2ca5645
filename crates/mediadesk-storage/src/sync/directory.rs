//! Directory reconciliation.

use std::path::Path;

use tokio::fs;
use tracing::{debug, error, info};

use mediadesk_core::types::DirId;
use mediadesk_core::{AppError, AppResult};
use mediadesk_entity::{EntryKey, EntryTree};

use super::StorageSynchronizer;
use crate::roots::{exists, is_dir};

fn missing(id: DirId) -> AppError {
    AppError::not_found(format!("Directory {id} not found"))
}

impl StorageSynchronizer {
    /// Create a new directory in both roots.
    ///
    /// Both mirrors are kept so that switching protection later never has to
    /// create directories for the files being moved.
    pub(super) async fn create_directory(&self, tree: &EntryTree, id: DirId) -> AppResult<()> {
        let path = &tree.find_directory(id).ok_or_else(|| missing(id))?.meta.path;

        for root in self.roots.mirrors() {
            let target = root.join(path);
            if is_dir(&target).await {
                error!(path = %target.display(), "Directory already exists");
                return Err(AppError::create_directory(&target, "already exists"));
            }
        }
        for root in self.roots.mirrors() {
            make_dir(&root.join(path)).await?;
        }

        info!(dir_id = %id, path = %path, "Directory created");
        Ok(())
    }

    /// Follow a path or protection change of a persisted directory.
    ///
    /// A missing source is tolerated: descendants of a renamed directory
    /// have already travelled with it. Missing mirrors are recreated.
    pub(super) async fn reconcile_directory(&self, tree: &EntryTree, id: DirId) -> AppResult<()> {
        let meta = &tree.find_directory(id).ok_or_else(|| missing(id))?.meta;

        if let Some(previous) = meta.previous_path.as_deref().filter(|p| *p != meta.path) {
            for root in self.roots.mirrors() {
                let from = root.join(previous);
                let to = root.join(&meta.path);
                rename_dir(&from, &to).await?;
            }
            info!(dir_id = %id, from = %previous, to = %meta.path, "Directory moved");
        }

        for root in self.roots.mirrors() {
            let target = root.join(&meta.path);
            if !is_dir(&target).await {
                make_dir(&target).await?;
                debug!(path = %target.display(), "Missing directory mirror created");
            }
        }
        Ok(())
    }

    /// Remove a directory subtree bottom-up from both roots, files first.
    pub(super) async fn remove_directory_tree(&self, tree: &EntryTree, id: DirId) -> AppResult<()> {
        if tree.find_directory(id).is_none() {
            return Err(missing(id));
        }
        let (dirs, files) = tree.subtree(id);

        for file in files {
            self.remove_file(tree, file).await?;
        }

        for dir in dirs {
            let Some(meta) = tree.meta(EntryKey::Directory(dir)) else {
                continue;
            };
            for root in self.roots.mirrors() {
                remove_dir(&root.join(&meta.path)).await?;
            }
            info!(dir_id = %dir, path = %meta.path, "Directory removed");
        }
        Ok(())
    }
}

async fn make_dir(target: &Path) -> AppResult<()> {
    if let Err(e) = fs::create_dir_all(target).await {
        error!(path = %target.display(), error = %e, "Failed to create directory");
        return Err(AppError::create_directory(target, "could not be created").caused_by(e));
    }
    if !is_dir(target).await {
        error!(path = %target.display(), "Directory missing after creation");
        return Err(AppError::create_directory(target, "is missing after creation"));
    }
    Ok(())
}

async fn rename_dir(from: &Path, to: &Path) -> AppResult<()> {
    let source_present = is_dir(from).await;
    let target_present = exists(to).await;

    match (source_present, target_present) {
        (false, _) => {
            debug!(from = %from.display(), "Directory source already gone, nothing to rename");
            Ok(())
        }
        (true, true) => {
            error!(from = %from.display(), to = %to.display(), "Rename target already exists");
            Err(AppError::rename_directory(to, "already exists"))
        }
        (true, false) => {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::rename_directory(parent, "parent could not be created").caused_by(e)
                })?;
            }
            if let Err(e) = fs::rename(from, to).await {
                error!(from = %from.display(), to = %to.display(), error = %e, "Directory rename failed");
                return Err(AppError::rename_directory(from, "could not be renamed").caused_by(e));
            }
            if !is_dir(to).await || exists(from).await {
                error!(from = %from.display(), to = %to.display(), "Directory rename did not take effect");
                return Err(AppError::rename_directory(from, "was not renamed"));
            }
            Ok(())
        }
    }
}

async fn remove_dir(target: &Path) -> AppResult<()> {
    if !exists(target).await {
        debug!(path = %target.display(), "Directory already removed");
        return Ok(());
    }
    if let Err(e) = fs::remove_dir(target).await {
        error!(path = %target.display(), error = %e, "Failed to remove directory");
        return Err(AppError::remove_directory(target, "could not be removed").caused_by(e));
    }
    if exists(target).await {
        error!(path = %target.display(), "Directory still present after removal");
        return Err(AppError::remove_directory(target, "is still present after removal"));
    }
    Ok(())
}
