//! File entity and its pending payload.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use mediadesk_core::types::FileId;
use mediadesk_core::{AppError, AppResult};

use super::EntryMeta;
use crate::naming::normalize_name;

/// Content waiting to be moved into place at the next commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingPayload {
    /// A completed upload sitting in the staging directory.
    Upload {
        /// Where the upload was staged.
        staged_path: PathBuf,
        /// File name as sent by the client.
        original_name: String,
    },
    /// An existing file on disk to be copied in.
    Existing {
        /// Path of the source file.
        source_path: PathBuf,
    },
}

impl PendingPayload {
    /// The physical file the payload is read from.
    pub fn source(&self) -> &PathBuf {
        match self {
            Self::Upload { staged_path, .. } => staged_path,
            Self::Existing { source_path } => source_path,
        }
    }

    /// The sanitized basename the payload should be stored under.
    pub fn target_name(&self) -> AppResult<String> {
        match self {
            Self::Upload { original_name, .. } => normalize_name(original_name),
            Self::Existing { source_path } => {
                let basename = source_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| {
                        AppError::invalid_name(format!(
                            "Source '{}' has no usable file name",
                            source_path.display()
                        ))
                    })?;
                normalize_name(basename)
            }
        }
    }
}

/// A file in the logical tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    /// Stable identifier.
    pub id: FileId,
    /// Shared attributes.
    #[serde(flatten)]
    pub meta: EntryMeta,
    /// Size of the stored payload in bytes.
    pub size_bytes: u64,
    /// Detected MIME type of the stored payload.
    pub mime_type: Option<String>,
    /// Payload consumed by the next commit.
    #[serde(skip)]
    pub pending: Option<PendingPayload>,
}

impl File {
    /// File extension of the logical path, lowercased.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = crate::naming::split_extension(self.meta.basename());
        ext.map(|e| e.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_target_name_is_sanitized() {
        let payload = PendingPayload::Upload {
            staged_path: PathBuf::from("/tmp/upload-1"),
            original_name: "Quarterly Report.PDF".to_string(),
        };
        assert_eq!(payload.target_name().unwrap(), "quarterly-report.pdf");
    }

    #[test]
    fn test_existing_target_name_uses_basename() {
        let payload = PendingPayload::Existing {
            source_path: PathBuf::from("/srv/import/Fotka Žirafy.JPG"),
        };
        assert_eq!(payload.target_name().unwrap(), "fotka-zirafy.jpg");
    }
}
