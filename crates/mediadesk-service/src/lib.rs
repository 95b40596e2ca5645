//! # mediadesk-service
//!
//! Use-case services for mediadesk. Each service opens a transaction on the
//! entry store, applies checked mutations to the working tree and commits,
//! letting the storage synchronizer reconcile both physical roots.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod browser;
pub mod context;
pub mod entry;
pub mod file;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowserListing, BrowserService, ListedEntry, TreeNode};
pub use context::RequestContext;
pub use entry::{CreateDirectoryRequest, EntryInfo, EntryService, MoveRequest, UpdateEntryRequest};
pub use file::{
    MediaFile, MediaLinks, MediaService, UploadFailure, UploadItem, UploadReport, UploadService,
    UploadedFile,
};
