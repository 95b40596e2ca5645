//! Typed path parameter helpers.

use mediadesk_core::types::{DirId, FileId};
use mediadesk_core::{AppError, AppResult};
use mediadesk_entity::EntryKey;

/// Parses a `d:<id>` / `f:<id>` key from a path segment.
pub fn parse_key(s: &str) -> AppResult<EntryKey> {
    s.parse()
}

/// Parses a directory id from a path segment.
pub fn parse_dir_id(s: &str) -> AppResult<DirId> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid directory id: {s}")))
}

/// Parses a file id from a path segment.
pub fn parse_file_id(s: &str) -> AppResult<FileId> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid file id: {s}")))
}
