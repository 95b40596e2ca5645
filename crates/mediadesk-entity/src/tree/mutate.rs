//! Checked mutations.
//!
//! Setters are no-ops when the value does not change; otherwise they
//! require write access to the entry before touching it.

use tracing::debug;

use mediadesk_core::types::{DirId, FileId, UserId};
use mediadesk_core::{AppError, AppResult};

use super::{missing, EntryTree};
use crate::entry::{Directory, EntryKey, EntryMeta, File, PendingPayload};
use crate::permission::AccessContext;

impl EntryTree {
    /// Fail unless the entry exists and is writable.
    pub fn ensure_writable(&self, ctx: &AccessContext, key: EntryKey) -> AppResult<()> {
        let meta = self.meta(key).ok_or_else(|| missing(key))?;
        ctx.ensure_write(meta)
    }

    /// Create a new directory under `parent`.
    ///
    /// The acting principal becomes the author and the parent's protection
    /// and grants are inherited.
    pub fn create_directory(
        &mut self,
        ctx: &AccessContext,
        parent: Option<DirId>,
        name: &str,
    ) -> AppResult<DirId> {
        let meta = self.new_meta(ctx, parent, name)?;
        let id = DirId::new();
        debug!(dir_id = %id, path = %meta.path, "Directory staged");
        self.directories.insert(id, Directory { id, meta });
        Ok(id)
    }

    /// Create a new file under `parent` from a pending payload.
    ///
    /// The path derived from the payload name is provisional; storage picks
    /// the final, non-colliding name at commit time.
    pub fn create_file(
        &mut self,
        ctx: &AccessContext,
        parent: Option<DirId>,
        payload: PendingPayload,
    ) -> AppResult<FileId> {
        let name = payload.target_name()?;
        let meta = self.new_meta(ctx, parent, &name)?;
        let id = FileId::new();
        debug!(file_id = %id, path = %meta.path, "File staged");
        self.files.insert(
            id,
            File {
                id,
                meta,
                size_bytes: 0,
                mime_type: None,
                pending: Some(payload),
            },
        );
        Ok(id)
    }

    fn new_meta(
        &self,
        ctx: &AccessContext,
        parent: Option<DirId>,
        name: &str,
    ) -> AppResult<EntryMeta> {
        if let Some(parent_id) = parent {
            self.ensure_writable(ctx, EntryKey::Directory(parent_id))?;
        }
        let path = self.compute_path(parent, name)?;
        let mut meta = EntryMeta::new(name, path, parent);
        meta.author_id = ctx.principal().map(|p| p.user_id);

        if let Some(parent) = parent.and_then(|id| self.find_directory(id)) {
            meta.protected = parent.meta.protected;
            meta.read_grants = parent.meta.read_grants.clone();
            meta.write_grants = parent.meta.write_grants.clone();
        }
        Ok(meta)
    }

    /// Change the display name, re-resolving the path (and the subtree for
    /// directories).
    pub fn rename(&mut self, ctx: &AccessContext, key: EntryKey, name: &str) -> AppResult<()> {
        let meta = self.meta(key).ok_or_else(|| missing(key))?;
        if meta.name == name {
            return Ok(());
        }
        ctx.ensure_write(meta)?;
        // validate before mutating anything
        self.compute_path(meta.parent_id, name)?;

        let meta = self.meta_mut(key)?;
        meta.name = name.to_string();
        meta.touch();
        self.resolve_path(key)
    }

    /// Move an entry under another directory (root level for `None`).
    pub fn set_parent(
        &mut self,
        ctx: &AccessContext,
        key: EntryKey,
        parent: Option<DirId>,
    ) -> AppResult<()> {
        let meta = self.meta(key).ok_or_else(|| missing(key))?;
        if meta.parent_id == parent {
            return Ok(());
        }
        ctx.ensure_write(meta)?;

        if let Some(parent_id) = parent {
            if let EntryKey::Directory(id) = key {
                if self.is_within(parent_id, id) {
                    return Err(AppError::validation(
                        "A directory cannot be moved into itself or one of its descendants",
                    ));
                }
            }
            self.ensure_writable(ctx, EntryKey::Directory(parent_id))?;
        }

        self.meta_mut(key)?.parent_id = parent;
        self.resolve_path(key)
    }

    /// Show or hide an entry in default listings.
    pub fn set_invisible(
        &mut self,
        ctx: &AccessContext,
        key: EntryKey,
        invisible: bool,
    ) -> AppResult<()> {
        self.update_meta(ctx, key, |meta| {
            if meta.invisible == invisible {
                return false;
            }
            meta.invisible = invisible;
            true
        })
    }

    /// Switch the entry between the public and protected storage root.
    pub fn set_protected(
        &mut self,
        ctx: &AccessContext,
        key: EntryKey,
        protected: bool,
    ) -> AppResult<()> {
        self.update_meta(ctx, key, |meta| {
            if meta.protected == protected {
                return false;
            }
            meta.apply_protected(protected);
            true
        })
    }

    /// Change or clear the owning author.
    pub fn set_author(
        &mut self,
        ctx: &AccessContext,
        key: EntryKey,
        author: Option<UserId>,
    ) -> AppResult<()> {
        self.update_meta(ctx, key, |meta| {
            if meta.author_id == author {
                return false;
            }
            meta.author_id = author;
            true
        })
    }

    /// Grant read access to a role.
    pub fn add_read_grant(&mut self, ctx: &AccessContext, key: EntryKey, role: &str) -> AppResult<()> {
        self.update_meta(ctx, key, |meta| meta.read_grants.insert(role.to_string()))
    }

    /// Grant write access to a role.
    pub fn add_write_grant(
        &mut self,
        ctx: &AccessContext,
        key: EntryKey,
        role: &str,
    ) -> AppResult<()> {
        self.update_meta(ctx, key, |meta| meta.write_grants.insert(role.to_string()))
    }

    /// Attach a payload to a file; it is moved into place at the next commit.
    ///
    /// For a persisted file the current location is remembered so the old
    /// physical file can be removed once the new one lands.
    pub fn set_file(
        &mut self,
        ctx: &AccessContext,
        id: FileId,
        payload: PendingPayload,
    ) -> AppResult<()> {
        let file = self
            .files
            .get_mut(&id)
            .ok_or_else(|| missing(EntryKey::File(id)))?;
        ctx.ensure_write(&file.meta)?;

        let meta = &mut file.meta;
        if meta.persisted && meta.previous_path.is_none() {
            meta.previous_path = Some(meta.path.clone());
            meta.previous_protected = Some(meta.protected);
        }
        meta.touch();
        file.pending = Some(payload);
        Ok(())
    }

    /// Apply `change` after a write check. `change` reports whether it
    /// modified anything; the check is skipped when nothing would change.
    fn update_meta<F>(&mut self, ctx: &AccessContext, key: EntryKey, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut EntryMeta) -> bool,
    {
        let meta = self.meta(key).ok_or_else(|| missing(key))?;
        let mut probe = meta.clone();
        if !change(&mut probe) {
            return Ok(());
        }
        ctx.ensure_write(meta)?;

        let meta = self.meta_mut(key)?;
        *meta = probe;
        meta.touch();
        Ok(())
    }
}
