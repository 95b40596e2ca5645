//! Path resolution.

use mediadesk_core::types::DirId;
use mediadesk_core::AppResult;

use super::{missing, EntryTree};
use crate::entry::EntryKey;
use crate::naming::normalize_name;

impl EntryTree {
    /// Compute the path an entry named `name` would have under `parent`.
    pub fn compute_path(&self, parent: Option<DirId>, name: &str) -> AppResult<String> {
        let segment = normalize_name(name)?;
        match parent {
            Some(parent_id) => {
                let parent = self
                    .find_directory(parent_id)
                    .ok_or_else(|| missing(EntryKey::Directory(parent_id)))?;
                Ok(format!("{}/{segment}", parent.meta.path))
            }
            None => Ok(segment),
        }
    }

    /// Recompute the path of an entry from its name and parent chain.
    ///
    /// Directories re-resolve their whole subtree, parents before children.
    /// Descendants are re-resolved without a permission check: they follow
    /// the ancestor the caller was allowed to change.
    pub fn resolve_path(&mut self, key: EntryKey) -> AppResult<()> {
        let (parent, name) = {
            let meta = self.meta(key).ok_or_else(|| missing(key))?;
            (meta.parent_id, meta.name.clone())
        };
        let path = self.compute_path(parent, &name)?;
        self.meta_mut(key)?.apply_path(path);

        if let EntryKey::Directory(id) = key {
            let dirs: Vec<EntryKey> = self
                .child_directories(Some(id))
                .iter()
                .map(|d| EntryKey::Directory(d.id))
                .collect();
            let files: Vec<EntryKey> = self
                .child_files(Some(id))
                .iter()
                .map(|f| EntryKey::File(f.id))
                .collect();
            for child in dirs.into_iter().chain(files) {
                self.resolve_path(child)?;
            }
        }
        Ok(())
    }
}
