//! Directory and file metadata management.

pub mod service;

pub use service::{
    CreateDirectoryRequest, EntryInfo, EntryService, MoveRequest, UpdateEntryRequest,
};
