//! The logical entry tree.
//!
//! [`EntryTree`] owns every directory and file of one store and is the only
//! place where entries are mutated. Checked accessors take an
//! [`AccessContext`] and enforce the permission model; the unchecked
//! `find_*` lookups exist for the persistence and storage layers, which
//! operate on behalf of an already authorized mutation.

mod grants;
mod mutate;
mod path;

use std::collections::{HashMap, HashSet};

use mediadesk_core::types::{DirId, FileId};
use mediadesk_core::{AppError, AppResult};

use crate::entry::{Directory, EntryKey, EntryMeta, File};
use crate::permission::AccessContext;

/// All directories and files of one store.
#[derive(Debug, Clone, Default)]
pub struct EntryTree {
    directories: HashMap<DirId, Directory>,
    files: HashMap<FileId, File>,
}

impl EntryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from stored entries. Every entry is marked persisted.
    pub fn from_entries<D, F>(directories: D, files: F) -> Self
    where
        D: IntoIterator<Item = Directory>,
        F: IntoIterator<Item = File>,
    {
        let mut tree = Self {
            directories: directories.into_iter().map(|d| (d.id, d)).collect(),
            files: files.into_iter().map(|f| (f.id, f)).collect(),
        };
        tree.mark_all_committed();
        tree
    }

    /// Iterate over all directories in no particular order.
    pub fn directories(&self) -> impl Iterator<Item = &Directory> {
        self.directories.values()
    }

    /// Iterate over all files in no particular order.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unchecked directory lookup.
    pub fn find_directory(&self, id: DirId) -> Option<&Directory> {
        self.directories.get(&id)
    }

    /// Unchecked mutable directory lookup.
    pub fn find_directory_mut(&mut self, id: DirId) -> Option<&mut Directory> {
        self.directories.get_mut(&id)
    }

    /// Unchecked file lookup.
    pub fn find_file(&self, id: FileId) -> Option<&File> {
        self.files.get(&id)
    }

    /// Unchecked mutable file lookup.
    pub fn find_file_mut(&mut self, id: FileId) -> Option<&mut File> {
        self.files.get_mut(&id)
    }

    /// Unchecked metadata lookup.
    pub fn meta(&self, key: EntryKey) -> Option<&EntryMeta> {
        match key {
            EntryKey::Directory(id) => self.directories.get(&id).map(|d| &d.meta),
            EntryKey::File(id) => self.files.get(&id).map(|f| &f.meta),
        }
    }

    pub(crate) fn meta_mut(&mut self, key: EntryKey) -> AppResult<&mut EntryMeta> {
        match key {
            EntryKey::Directory(id) => self.directories.get_mut(&id).map(|d| &mut d.meta),
            EntryKey::File(id) => self.files.get_mut(&id).map(|f| &mut f.meta),
        }
        .ok_or_else(|| missing(key))
    }

    /// Whether the key refers to an existing entry.
    pub fn contains(&self, key: EntryKey) -> bool {
        self.meta(key).is_some()
    }

    /// Find the entry stored at a logical path.
    pub fn key_by_path(&self, path: &str) -> Option<EntryKey> {
        let path = path.trim_matches('/');
        self.directories
            .values()
            .find(|d| d.meta.path == path)
            .map(|d| EntryKey::Directory(d.id))
            .or_else(|| {
                self.files
                    .values()
                    .find(|f| f.meta.path == path)
                    .map(|f| EntryKey::File(f.id))
            })
    }

    /// Child directories of `parent` (root level for `None`), ordered by name.
    pub fn child_directories(&self, parent: Option<DirId>) -> Vec<&Directory> {
        let mut children: Vec<&Directory> = self
            .directories
            .values()
            .filter(|d| d.meta.parent_id == parent)
            .collect();
        children.sort_by(|a, b| (&a.meta.name, &a.meta.path).cmp(&(&b.meta.name, &b.meta.path)));
        children
    }

    /// Child files of `parent` (root level for `None`), ordered by name.
    pub fn child_files(&self, parent: Option<DirId>) -> Vec<&File> {
        let mut children: Vec<&File> = self
            .files
            .values()
            .filter(|f| f.meta.parent_id == parent)
            .collect();
        children.sort_by(|a, b| (&a.meta.name, &a.meta.path).cmp(&(&b.meta.name, &b.meta.path)));
        children
    }

    /// Whether a directory has any children at all.
    pub fn has_children(&self, id: DirId) -> bool {
        let parent = Some(id);
        self.directories.values().any(|d| d.meta.parent_id == parent)
            || self.files.values().any(|f| f.meta.parent_id == parent)
    }

    /// Number of ancestors of a directory (0 for root directories).
    pub fn depth(&self, id: DirId) -> usize {
        let mut depth = 0;
        let mut current = self.directories.get(&id).and_then(|d| d.meta.parent_id);
        while let Some(parent) = current {
            depth += 1;
            current = self.directories.get(&parent).and_then(|d| d.meta.parent_id);
        }
        depth
    }

    /// Whether `dir` is `ancestor` itself or one of its descendants.
    pub fn is_within(&self, dir: DirId, ancestor: DirId) -> bool {
        let mut current = Some(dir);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.directories.get(&id).and_then(|d| d.meta.parent_id);
        }
        false
    }

    /// Directory ids of a subtree in post-order (descendants before `id`),
    /// plus every file inside it.
    pub fn subtree(&self, id: DirId) -> (Vec<DirId>, Vec<FileId>) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        self.collect_subtree(id, &mut dirs, &mut files);
        (dirs, files)
    }

    fn collect_subtree(&self, id: DirId, dirs: &mut Vec<DirId>, files: &mut Vec<FileId>) {
        for child in self.child_directories(Some(id)) {
            self.collect_subtree(child.id, dirs, files);
        }
        files.extend(self.child_files(Some(id)).iter().map(|f| f.id));
        dirs.push(id);
    }

    /// Remove an entry and, for directories, everything below it.
    ///
    /// Returns the number of removed entries.
    pub fn detach(&mut self, key: EntryKey) -> usize {
        match key {
            EntryKey::File(id) => usize::from(self.files.remove(&id).is_some()),
            EntryKey::Directory(id) => {
                if !self.directories.contains_key(&id) {
                    return 0;
                }
                let (dirs, files) = self.subtree(id);
                for file in &files {
                    self.files.remove(file);
                }
                for dir in &dirs {
                    self.directories.remove(dir);
                }
                dirs.len() + files.len()
            }
        }
    }

    /// Return the first logical path used by more than one entry.
    ///
    /// Files still carrying a pending payload have a provisional path until
    /// storage picks their final name; they are skipped unless
    /// `include_pending` is set.
    pub fn find_path_collision(&self, include_pending: bool) -> Option<String> {
        let mut seen = HashSet::with_capacity(self.len());
        let dir_paths = self.directories.values().map(|d| &d.meta.path);
        let file_paths = self
            .files
            .values()
            .filter(|f| include_pending || f.pending.is_none())
            .map(|f| &f.meta.path);

        for path in dir_paths.chain(file_paths) {
            if !seen.insert(path.as_str()) {
                return Some(path.clone());
            }
        }
        None
    }

    /// Reset transient state on every entry.
    pub fn mark_all_committed(&mut self) {
        for dir in self.directories.values_mut() {
            dir.meta.mark_committed();
        }
        for file in self.files.values_mut() {
            file.meta.mark_committed();
            file.pending = None;
        }
    }

    /// Checked directory lookup.
    pub fn directory(&self, ctx: &AccessContext, id: DirId) -> AppResult<&Directory> {
        let dir = self
            .directories
            .get(&id)
            .ok_or_else(|| missing(EntryKey::Directory(id)))?;
        ctx.ensure_read(&dir.meta)?;
        Ok(dir)
    }

    /// Checked file lookup.
    pub fn file(&self, ctx: &AccessContext, id: FileId) -> AppResult<&File> {
        let file = self
            .files
            .get(&id)
            .ok_or_else(|| missing(EntryKey::File(id)))?;
        ctx.ensure_read(&file.meta)?;
        Ok(file)
    }

    /// Checked metadata lookup.
    pub fn read_meta(&self, ctx: &AccessContext, key: EntryKey) -> AppResult<&EntryMeta> {
        let meta = self.meta(key).ok_or_else(|| missing(key))?;
        ctx.ensure_read(meta)?;
        Ok(meta)
    }

    /// Display names of a directory and its ancestors joined with `/`.
    pub fn display_path(&self, ctx: &AccessContext, id: DirId) -> AppResult<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(dir_id) = current {
            let dir = self.directory(ctx, dir_id)?;
            names.push(dir.meta.name.as_str());
            current = dir.meta.parent_id;
        }
        names.reverse();
        Ok(names.join("/"))
    }
}

pub(crate) fn missing(key: EntryKey) -> AppError {
    match key {
        EntryKey::Directory(id) => AppError::not_found(format!("Directory {id} not found")),
        EntryKey::File(id) => AppError::not_found(format!("File {id} not found")),
    }
}
