//! File reconciliation.

use std::path::Path;

use tokio::fs;
use tracing::{debug, error, info};

use mediadesk_core::types::FileId;
use mediadesk_core::{AppError, AppResult};
use mediadesk_entity::{AccessContext, EntryKey, EntryTree, PendingPayload};

use super::StorageSynchronizer;
use crate::mime::detect_mime;
use crate::naming::suggest_name;
use crate::roots::{exists, is_file};

fn missing(id: FileId) -> AppError {
    AppError::not_found(format!("File {id} not found"))
}

impl StorageSynchronizer {
    /// Move or copy a pending payload into place under a collision-free name.
    pub(super) async fn adopt_payload(
        &self,
        ctx: &AccessContext,
        tree: &mut EntryTree,
        id: FileId,
    ) -> AppResult<()> {
        let (payload, parent_path) = {
            let file = tree.find_file(id).ok_or_else(|| missing(id))?;
            let payload = file.pending.clone().ok_or_else(|| missing(id))?;
            let parent_path = file
                .meta
                .parent_id
                .and_then(|pid| tree.find_directory(pid))
                .map(|d| d.meta.path.clone());
            (payload, parent_path)
        };

        let basename = payload.target_name()?;
        let basename = suggest_name(&self.roots, parent_path.as_deref(), &basename).await;
        tree.rename(ctx, EntryKey::File(id), &basename)?;

        let meta = &tree.find_file(id).ok_or_else(|| missing(id))?.meta;
        if let Some(previous) = meta.previous_path.as_deref() {
            if previous != meta.path {
                let (old_protected, _) = meta.previous_location();
                let old = self.roots.resolve(old_protected, previous);
                unlink(&old).await?;
                debug!(path = %old.display(), "Replaced file removed");
            }
            // derivatives of the replaced content
            self.images.purge_path(previous).await?;
        }

        let dest = self.roots.resolve(meta.protected, &meta.path);
        ensure_parent(&dest, AppError::upload_file).await?;

        match &payload {
            PendingPayload::Upload { staged_path, .. } => move_upload(staged_path, &dest).await?,
            PendingPayload::Existing { source_path } => copy_existing(source_path, &dest).await?,
        }

        let size_bytes = fs::metadata(&dest).await.map(|m| m.len()).unwrap_or(0);
        let mime_type = detect_mime(&dest).await;
        info!(
            file_id = %id,
            path = %meta.path,
            size_bytes,
            mime = %mime_type,
            "File stored"
        );

        let file = tree.find_file_mut(id).ok_or_else(|| missing(id))?;
        file.size_bytes = size_bytes;
        file.mime_type = Some(mime_type);
        file.pending = None;
        Ok(())
    }

    /// Follow a path or protection change of a stored file.
    pub(super) async fn move_file(&self, tree: &EntryTree, id: FileId) -> AppResult<()> {
        let meta = &tree.find_file(id).ok_or_else(|| missing(id))?.meta;
        if !meta.location_changed() {
            return Ok(());
        }

        let (old_protected, old_path) = meta.previous_location();
        let old = self.roots.resolve(old_protected, old_path);
        let dest = self.roots.resolve(meta.protected, &meta.path);
        // where the file sits after an ancestor directory moved on disk
        let travelled = self
            .roots
            .resolve(old_protected, &travelled_path(&meta.path, old_path));

        let source = if is_file(&old).await {
            Some(old.clone())
        } else if travelled != dest && is_file(&travelled).await {
            Some(travelled)
        } else {
            None
        };
        let dest_present = exists(&dest).await;

        let Some(source) = source else {
            if dest_present {
                debug!(file_id = %id, path = %meta.path, "File already travelled with its directory");
                self.images.purge_path(old_path).await?;
                return Ok(());
            }
            error!(from = %old.display(), to = %dest.display(), "File to move is missing");
            return Err(AppError::rename_file(&old, "does not exist"));
        };

        if dest_present {
            error!(from = %source.display(), to = %dest.display(), "Move target already exists");
            return Err(AppError::rename_file(&dest, "already exists"));
        }

        ensure_parent(&dest, AppError::rename_file).await?;
        if let Err(e) = fs::rename(&source, &dest).await {
            error!(from = %source.display(), to = %dest.display(), error = %e, "File move failed");
            return Err(AppError::rename_file(&source, "could not be moved").caused_by(e));
        }
        if !is_file(&dest).await || exists(&source).await {
            error!(from = %source.display(), to = %dest.display(), "File move did not take effect");
            return Err(AppError::rename_file(&source, "was not moved"));
        }

        self.images.purge_path(old_path).await?;
        info!(file_id = %id, from = %source.display(), to = %dest.display(), "File moved");
        Ok(())
    }

    /// Delete a stored file and purge its cached derivatives.
    pub(super) async fn remove_file(&self, tree: &EntryTree, id: FileId) -> AppResult<()> {
        let meta = &tree.find_file(id).ok_or_else(|| missing(id))?.meta;
        let path = self.roots.resolve(meta.protected, &meta.path);

        if !is_file(&path).await {
            error!(path = %path.display(), "File to remove does not exist");
            return Err(AppError::remove_file(&path, "does not exist"));
        }
        unlink(&path).await?;
        let purged = self.images.purge(meta.basename()).await?;

        info!(file_id = %id, path = %meta.path, purged, "File removed");
        Ok(())
    }
}

/// The file's current parent path joined with its previous basename.
fn travelled_path(path: &str, previous: &str) -> String {
    let basename = previous.rsplit('/').next().unwrap_or(previous);
    match path.rsplit_once('/') {
        Some((parent, _)) => format!("{parent}/{basename}"),
        None => basename.to_string(),
    }
}

async fn ensure_parent(
    dest: &Path,
    fail: fn(&Path, &str) -> AppError,
) -> AppResult<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| fail(parent, "parent directory could not be created").caused_by(e))?;
    }
    Ok(())
}

async fn unlink(path: &Path) -> AppResult<()> {
    if exists(path).await {
        if let Err(e) = fs::remove_file(path).await {
            error!(path = %path.display(), error = %e, "Failed to remove file");
            return Err(AppError::remove_file(path, "could not be removed").caused_by(e));
        }
    }
    if exists(path).await {
        error!(path = %path.display(), "File still present after removal");
        return Err(AppError::remove_file(path, "is still present after removal"));
    }
    Ok(())
}

async fn move_upload(staged: &Path, dest: &Path) -> AppResult<()> {
    if !is_file(staged).await {
        error!(path = %staged.display(), "Staged upload is missing");
        return Err(AppError::upload_file(dest, "staged upload is missing"));
    }
    if fs::rename(staged, dest).await.is_err() {
        // staging may live on another filesystem
        fs::copy(staged, dest).await.map_err(|e| {
            error!(from = %staged.display(), to = %dest.display(), error = %e, "Upload copy failed");
            AppError::upload_file(dest, "could not be written").caused_by(e)
        })?;
        let _ = fs::remove_file(staged).await;
    }
    if !is_file(dest).await {
        error!(path = %dest.display(), "Upload missing after move");
        return Err(AppError::upload_file(dest, "file is missing after move"));
    }
    Ok(())
}

async fn copy_existing(source: &Path, dest: &Path) -> AppResult<()> {
    if !is_file(source).await {
        error!(path = %source.display(), "Source file is missing");
        return Err(AppError::rename_file(source, "does not exist"));
    }
    if let Err(e) = fs::copy(source, dest).await {
        error!(from = %source.display(), to = %dest.display(), error = %e, "File copy failed");
        return Err(AppError::rename_file(dest, "could not be copied").caused_by(e));
    }
    if !is_file(dest).await {
        error!(path = %dest.display(), "Copied file is missing");
        return Err(AppError::rename_file(dest, "is missing after copy"));
    }
    Ok(())
}
