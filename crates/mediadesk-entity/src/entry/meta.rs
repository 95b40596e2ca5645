//! Attributes shared by directories and files.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mediadesk_core::types::{DirId, UserId};

/// Common entry attributes.
///
/// `persisted`, `previous_path` and `previous_protected` are transient: they
/// are never serialized and are reset after every successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Display name as entered by the user.
    pub name: String,
    /// Normalized logical path from the tree root, unique across all entries.
    pub path: String,
    /// Parent directory (None for root entries).
    pub parent_id: Option<DirId>,
    /// Hidden from default listings.
    pub invisible: bool,
    /// Selects the protected storage root and enables grant checks.
    pub protected: bool,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When a visible attribute last changed.
    pub updated_at: DateTime<Utc>,
    /// Owning user; `None` means anyone may write.
    pub author_id: Option<UserId>,
    /// Roles with explicit read access.
    pub read_grants: BTreeSet<String>,
    /// Roles with explicit write access.
    pub write_grants: BTreeSet<String>,
    /// Whether the entry has been committed at least once.
    #[serde(skip)]
    pub persisted: bool,
    /// Path before the first path change of the current cycle.
    #[serde(skip)]
    pub previous_path: Option<String>,
    /// Protection flag before the first change of the current cycle.
    #[serde(skip)]
    pub previous_protected: Option<bool>,
}

impl EntryMeta {
    /// Create metadata for a new, not yet persisted entry.
    pub fn new(name: &str, path: String, parent_id: Option<DirId>) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            path,
            parent_id,
            invisible: false,
            protected: false,
            created_at: now,
            updated_at: now,
            author_id: None,
            read_grants: BTreeSet::new(),
            write_grants: BTreeSet::new(),
            persisted: false,
            previous_path: None,
            previous_protected: None,
        }
    }

    /// Last path segment.
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Store a freshly resolved path, tracking the previous one.
    ///
    /// The first change of a persisted entry remembers the old path; moving
    /// back to the remembered path forgets it again.
    pub fn apply_path(&mut self, new_path: String) {
        if new_path == self.path {
            return;
        }
        if self.persisted {
            match &self.previous_path {
                None => self.previous_path = Some(self.path.clone()),
                Some(prev) if *prev == new_path => self.previous_path = None,
                Some(_) => {}
            }
        }
        self.path = new_path;
    }

    /// Store a new protection flag, tracking the previous one.
    pub fn apply_protected(&mut self, protected: bool) {
        if protected == self.protected {
            return;
        }
        match self.previous_protected {
            None => self.previous_protected = Some(self.protected),
            Some(prev) if prev == protected => self.previous_protected = None,
            Some(_) => {}
        }
        self.protected = protected;
    }

    /// The (protected, path) pair the entry occupied before this cycle.
    pub fn previous_location(&self) -> (bool, &str) {
        (
            self.previous_protected.unwrap_or(self.protected),
            self.previous_path.as_deref().unwrap_or(&self.path),
        )
    }

    /// Whether the physical location differs from the one before this cycle.
    pub fn location_changed(&self) -> bool {
        self.previous_location() != (self.protected, self.path.as_str())
    }

    /// Reset the transient state after a successful commit.
    pub fn mark_committed(&mut self) {
        self.persisted = true;
        self.previous_path = None;
        self.previous_protected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_does_not_track_path() {
        let mut meta = EntryMeta::new("a", "a".to_string(), None);
        meta.apply_path("b".to_string());
        assert_eq!(meta.path, "b");
        assert!(meta.previous_path.is_none());
    }

    #[test]
    fn test_persisted_entry_tracks_first_path_only() {
        let mut meta = EntryMeta::new("a", "a".to_string(), None);
        meta.mark_committed();

        meta.apply_path("b".to_string());
        meta.apply_path("c".to_string());
        assert_eq!(meta.previous_path.as_deref(), Some("a"));
        assert!(meta.location_changed());

        meta.apply_path("a".to_string());
        assert!(meta.previous_path.is_none());
        assert!(!meta.location_changed());
    }

    #[test]
    fn test_protected_round_trip_leaves_nothing_pending() {
        let mut meta = EntryMeta::new("a", "a".to_string(), None);
        meta.mark_committed();

        meta.apply_protected(true);
        assert_eq!(meta.previous_protected, Some(false));
        assert_eq!(meta.previous_location(), (false, "a"));

        meta.apply_protected(false);
        assert!(meta.previous_protected.is_none());
        assert!(!meta.location_changed());
    }

    #[test]
    fn test_basename() {
        let meta = EntryMeta::new("a.jpg", "images/2024/a.jpg".to_string(), None);
        assert_eq!(meta.basename(), "a.jpg");
    }
}
