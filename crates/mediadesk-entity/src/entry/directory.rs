//! Directory entity.

use serde::{Deserialize, Serialize};

use mediadesk_core::types::DirId;

use super::EntryMeta;

/// A directory in the logical tree.
///
/// Children are not stored on the directory itself; the
/// [`EntryTree`](crate::EntryTree) derives them from parent links, ordered
/// by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directory {
    /// Stable identifier.
    pub id: DirId,
    /// Shared attributes.
    #[serde(flatten)]
    pub meta: EntryMeta,
}

impl Directory {
    /// Check if this is a root directory (no parent).
    pub fn is_root(&self) -> bool {
        self.meta.parent_id.is_none()
    }
}
