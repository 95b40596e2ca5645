//! Request and response DTOs that are not service types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use mediadesk_core::types::{DirId, UserId};
use mediadesk_core::{AppError, AppResult};
use mediadesk_entity::EntryKey;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Query of the directory listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Directory to list, the tree root when absent.
    pub dir: Option<DirId>,
}

/// Query of the lazy tree endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeQuery {
    /// Parent node key; must be a directory.
    pub parent: Option<EntryKey>,
    /// Comma-separated directory ids whose children are inlined.
    pub expanded: Option<String>,
}

impl TreeQuery {
    /// The parent directory, rejecting file keys.
    pub fn parent_dir(&self) -> AppResult<Option<DirId>> {
        match self.parent {
            None => Ok(None),
            Some(key) => key
                .as_directory()
                .map(Some)
                .ok_or_else(|| AppError::validation("Tree parent must be a directory")),
        }
    }

    /// Parses the expanded set.
    pub fn expanded_set(&self) -> AppResult<HashSet<DirId>> {
        let Some(raw) = &self.expanded else {
            return Ok(HashSet::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.trim_start_matches("d:")
                    .parse::<DirId>()
                    .map_err(|_| AppError::validation(format!("Invalid directory id: {s}")))
            })
            .collect()
    }
}

/// Image variant parameters given as query string on a media URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageQuery {
    /// `default` or `WxH`.
    pub size: Option<String>,
    /// Fit mode or `default`.
    pub format: Option<String>,
    /// Output type or `default`.
    #[serde(rename = "type")]
    pub image_type: Option<String>,
}

impl ImageQuery {
    /// Whether any variant parameter was given.
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.format.is_none() && self.image_type.is_none()
    }
}

/// Body of `PUT /api/entries/{key}/author`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAuthorRequest {
    /// New author, `null` to make the entry unowned.
    pub author_id: Option<UserId>,
}

/// Body of `POST /api/entries/{key}/permissions/copy`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyPermissionRequest {
    /// Entry to copy from, the parent directory when absent.
    pub source: Option<EntryKey>,
}
