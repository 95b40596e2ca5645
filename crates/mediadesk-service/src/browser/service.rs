//! Directory listings and tree nodes for the file browser.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use mediadesk_core::types::DirId;
use mediadesk_core::{AppError, AppResult};
use mediadesk_database::EntryStore;
use mediadesk_entity::{AccessContext, EntryKey, EntryMeta, EntryTree};

use crate::context::RequestContext;
use crate::file::MediaLinks;

/// One row of a directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListedEntry {
    /// Typed key.
    pub key: EntryKey,
    /// Display name.
    pub name: String,
    /// Logical path.
    pub path: String,
    /// Whether the entry is a directory.
    pub folder: bool,
    /// Whether the entry lives in the protected root.
    pub protected: bool,
    /// Stored size, files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Public URL, files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Contents of the current directory.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserListing {
    /// The listed directory, `None` for the tree root.
    pub current: Option<DirId>,
    /// Parent of the listed directory, for the "up" link.
    pub parent: Option<DirId>,
    /// Display names from the top down, e.g. `Photos/2024`.
    pub display_path: String,
    /// Visible child directories, then visible child files, each by name.
    pub entries: Vec<ListedEntry>,
}

/// A node of the lazy-loading directory tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    /// Typed key, `d:<id>` or `f:<id>`.
    pub key: EntryKey,
    /// Display name.
    pub title: String,
    /// Whether the node is a directory.
    pub folder: bool,
    /// Whether the directory has children to load.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub lazy: bool,
    /// Whether the children were loaded inline.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub expanded: bool,
    /// Inline children of an expanded directory.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Lists directories for the browser UI, optionally confined to a root.
#[derive(Debug, Clone)]
pub struct BrowserService {
    /// Entry store.
    store: Arc<EntryStore>,
    /// URL builder for file rows.
    links: MediaLinks,
    /// Directory the browser may not leave.
    root: Option<DirId>,
}

impl BrowserService {
    /// Creates an unconfined browser service.
    pub fn new(store: Arc<EntryStore>, links: MediaLinks) -> Self {
        Self {
            store,
            links,
            root: None,
        }
    }

    /// A copy of this service confined to `root` and its descendants.
    pub fn bound_to(&self, root: DirId) -> Self {
        Self {
            root: Some(root),
            ..self.clone()
        }
    }

    /// Lists the visible, readable children of `current` (the tree root for
    /// `None`).
    pub async fn list(&self, ctx: &RequestContext, current: Option<DirId>) -> AppResult<BrowserListing> {
        let access = ctx.access();
        self.store
            .read(|tree| -> AppResult<BrowserListing> {
                self.check_current(tree, current)?;
                let (parent, display_path) = match current {
                    Some(id) => (
                        tree.directory(&access, id)?.meta.parent_id,
                        tree.display_path(&access, id)?,
                    ),
                    None => (None, String::new()),
                };

                let dirs = tree
                    .child_directories(current)
                    .into_iter()
                    .filter(|d| listable(&access, &d.meta))
                    .map(|d| ListedEntry {
                        key: EntryKey::Directory(d.id),
                        name: d.meta.name.clone(),
                        path: d.meta.path.clone(),
                        folder: true,
                        protected: d.meta.protected,
                        size_bytes: None,
                        url: None,
                    });
                let files = tree
                    .child_files(current)
                    .into_iter()
                    .filter(|f| listable(&access, &f.meta))
                    .map(|f| ListedEntry {
                        key: EntryKey::File(f.id),
                        name: f.meta.name.clone(),
                        path: f.meta.path.clone(),
                        folder: false,
                        protected: f.meta.protected,
                        size_bytes: Some(f.size_bytes),
                        url: (!f.meta.protected).then(|| self.links.file_url(&f.meta.path)),
                    });

                Ok(BrowserListing {
                    current,
                    parent,
                    display_path,
                    entries: dirs.chain(files).collect(),
                })
            })
            .await
    }

    /// Tree nodes below `parent`. Directories in `expanded` carry their
    /// children inline; the others are marked `lazy` when they have any.
    pub async fn tree(
        &self,
        ctx: &RequestContext,
        parent: Option<DirId>,
        expanded: &HashSet<DirId>,
    ) -> AppResult<Vec<TreeNode>> {
        let access = ctx.access();
        let parent = parent.or(self.root);
        self.store
            .read(|tree| -> AppResult<Vec<TreeNode>> {
                self.check_current(tree, parent)?;
                if let Some(id) = parent {
                    tree.directory(&access, id)?;
                }
                Ok(build_nodes(tree, &access, parent, expanded))
            })
            .await
    }

    fn check_current(&self, tree: &EntryTree, current: Option<DirId>) -> AppResult<()> {
        let Some(root) = self.root else {
            return Ok(());
        };
        match current {
            Some(id) if tree.is_within(id, root) => Ok(()),
            _ => Err(AppError::not_found("Directory is outside the browser root")),
        }
    }
}

fn listable(access: &AccessContext, meta: &EntryMeta) -> bool {
    !meta.invisible && access.can_read(meta)
}

fn build_nodes(
    tree: &EntryTree,
    access: &AccessContext,
    parent: Option<DirId>,
    expanded: &HashSet<DirId>,
) -> Vec<TreeNode> {
    let mut nodes = Vec::new();
    for dir in tree.child_directories(parent) {
        if !listable(access, &dir.meta) {
            continue;
        }
        let open = expanded.contains(&dir.id);
        nodes.push(TreeNode {
            key: EntryKey::Directory(dir.id),
            title: dir.meta.name.clone(),
            folder: true,
            lazy: tree.has_children(dir.id),
            expanded: open,
            children: if open {
                build_nodes(tree, access, Some(dir.id), expanded)
            } else {
                Vec::new()
            },
        });
    }
    for file in tree.child_files(parent) {
        if !listable(access, &file.meta) {
            continue;
        }
        nodes.push(TreeNode {
            key: EntryKey::File(file.id),
            title: file.meta.name.clone(),
            folder: false,
            lazy: false,
            expanded: false,
            children: Vec::new(),
        });
    }
    nodes
}
