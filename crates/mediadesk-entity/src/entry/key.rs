//! Typed references to entries and drop placement modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mediadesk_core::AppError;
use mediadesk_core::types::{DirId, FileId};

/// A reference to either a directory or a file.
///
/// The wire form is `d:<uuid>` or `f:<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryKey {
    /// A directory.
    Directory(DirId),
    /// A file.
    File(FileId),
}

impl EntryKey {
    /// Return the directory id, if this key refers to a directory.
    pub fn as_directory(&self) -> Option<DirId> {
        match self {
            Self::Directory(id) => Some(*id),
            Self::File(_) => None,
        }
    }

    /// Return the file id, if this key refers to a file.
    pub fn as_file(&self) -> Option<FileId> {
        match self {
            Self::File(id) => Some(*id),
            Self::Directory(_) => None,
        }
    }
}

impl From<DirId> for EntryKey {
    fn from(id: DirId) -> Self {
        Self::Directory(id)
    }
}

impl From<FileId> for EntryKey {
    fn from(id: FileId) -> Self {
        Self::File(id)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(id) => write!(f, "d:{id}"),
            Self::File(id) => write!(f, "f:{id}"),
        }
    }
}

impl FromStr for EntryKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Invalid entry key: '{s}'"));
        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        match kind {
            "d" => id.parse().map(Self::Directory).map_err(|_| invalid()),
            "f" => id.parse().map(Self::File).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for EntryKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryKey> for String {
    fn from(key: EntryKey) -> Self {
        key.to_string()
    }
}

/// Placement of a dragged entry relative to its drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropMode {
    /// Sibling placed before the target.
    Before,
    /// Sibling placed after the target.
    After,
    /// Child of the target directory.
    Into,
}

impl FromStr for DropMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            "into" | "over" => Ok(Self::Into),
            _ => Err(AppError::validation(format!("Invalid drop mode: '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediadesk_core::ErrorKind;

    #[test]
    fn test_key_display_and_parse() {
        let id = DirId::new();
        let key = EntryKey::Directory(id);
        assert_eq!(key.to_string(), format!("d:{id}"));
        assert_eq!(key.to_string().parse::<EntryKey>().unwrap(), key);

        let fid = FileId::new();
        let parsed: EntryKey = format!("f:{fid}").parse().unwrap();
        assert_eq!(parsed.as_file(), Some(fid));
        assert_eq!(parsed.as_directory(), None);
    }

    #[test]
    fn test_key_rejects_garbage() {
        for raw in ["", "x:1", "d:", "d:not-a-uuid", "123"] {
            let err = raw.parse::<EntryKey>().unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{raw}");
        }
    }

    #[test]
    fn test_key_serde_as_string() {
        let key = EntryKey::File(FileId::new());
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{key}\""));
        let back: EntryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_drop_mode_parse() {
        assert_eq!("before".parse::<DropMode>().unwrap(), DropMode::Before);
        assert_eq!("AFTER".parse::<DropMode>().unwrap(), DropMode::After);
        assert_eq!("over".parse::<DropMode>().unwrap(), DropMode::Into);
        assert!("sideways".parse::<DropMode>().is_err());
    }
}
