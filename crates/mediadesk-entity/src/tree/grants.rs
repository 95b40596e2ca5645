//! Permission copying and propagation.

use mediadesk_core::types::DirId;
use mediadesk_core::AppResult;

use super::{missing, EntryTree};
use crate::entry::EntryKey;
use crate::permission::AccessContext;

impl EntryTree {
    /// Replace the protection flag and both grant sets of `key` with those
    /// of `source`, or of its parent when no source is given.
    ///
    /// Does nothing when neither is available.
    pub fn copy_permission(
        &mut self,
        ctx: &AccessContext,
        key: EntryKey,
        source: Option<EntryKey>,
    ) -> AppResult<()> {
        let meta = self.meta(key).ok_or_else(|| missing(key))?;
        ctx.ensure_write(meta)?;
        self.apply_permission_from(key, source)
    }

    /// Copy the permissions of `id` to every descendant, top-down.
    ///
    /// Only the starting directory is checked for write access.
    pub fn propagate_recursively(&mut self, ctx: &AccessContext, id: DirId) -> AppResult<()> {
        let dir = self
            .find_directory(id)
            .ok_or_else(|| missing(EntryKey::Directory(id)))?;
        ctx.ensure_write(&dir.meta)?;
        self.propagate_from(id)
    }

    fn propagate_from(&mut self, id: DirId) -> AppResult<()> {
        let dirs: Vec<DirId> = self
            .child_directories(Some(id))
            .iter()
            .map(|d| d.id)
            .collect();
        for child in dirs {
            self.apply_permission_from(EntryKey::Directory(child), None)?;
            self.propagate_from(child)?;
        }

        let files: Vec<EntryKey> = self
            .child_files(Some(id))
            .iter()
            .map(|f| EntryKey::File(f.id))
            .collect();
        for file in files {
            self.apply_permission_from(file, None)?;
        }
        Ok(())
    }

    pub(crate) fn apply_permission_from(
        &mut self,
        key: EntryKey,
        source: Option<EntryKey>,
    ) -> AppResult<()> {
        let source = match source {
            Some(source) => Some(source),
            None => self
                .meta(key)
                .ok_or_else(|| missing(key))?
                .parent_id
                .map(EntryKey::Directory),
        };
        let Some(source) = source else {
            return Ok(());
        };

        let (protected, read, write) = {
            let src = self.meta(source).ok_or_else(|| missing(source))?;
            (src.protected, src.read_grants.clone(), src.write_grants.clone())
        };

        let meta = self.meta_mut(key)?;
        let changed =
            meta.protected != protected || meta.read_grants != read || meta.write_grants != write;
        meta.apply_protected(protected);
        meta.read_grants = read;
        meta.write_grants = write;
        if changed {
            meta.touch();
        }
        Ok(())
    }
}
