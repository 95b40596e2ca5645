//! # mediadesk-entity
//!
//! Domain entities for the mediadesk file manager. Entries are plain data;
//! every mutation goes through [`EntryTree`], which resolves paths, enforces
//! the permission model and records the transient previous location that
//! the storage layer reconciles at commit time.

pub mod entry;
pub mod lifecycle;
pub mod naming;
pub mod permission;
pub mod tree;

pub use entry::{Directory, DropMode, EntryKey, EntryMeta, File, PendingPayload};
pub use lifecycle::CommitListener;
pub use naming::normalize_name;
pub use permission::{AccessContext, PermissionPolicy, Principal};
pub use tree::EntryTree;
