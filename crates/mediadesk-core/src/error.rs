//! Unified application error types for mediadesk.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The [`ErrorKind`] enum carries the
//! entry-lifecycle taxonomy so that callers can branch on *what* failed
//! without parsing messages.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The requested entry or resource was not found.
    NotFound,
    /// A read or write authorization check failed.
    PermissionDenied,
    /// A name normalizes to an empty path segment.
    InvalidName,
    /// A path collides with another entry.
    DuplicateName,
    /// A physical directory could not be created.
    CreateDirectory,
    /// A physical directory could not be removed.
    RemoveDirectory,
    /// A physical directory could not be renamed.
    RenameDirectory,
    /// An uploaded payload could not be moved into place.
    UploadFile,
    /// A physical file could not be renamed, moved or copied.
    RenameFile,
    /// A physical file could not be removed.
    RemoveFile,
    /// The requested image encoding or source extension is not supported.
    UnsupportedImageType,
    /// Input validation failed.
    Validation,
    /// A storage I/O error occurred outside a verified lifecycle step.
    Storage,
    /// Image decoding or encoding failed.
    Image,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind signals that the filesystem diverged from the
    /// expected state during a lifecycle step.
    pub fn is_filesystem_state(&self) -> bool {
        matches!(
            self,
            Self::CreateDirectory
                | Self::RemoveDirectory
                | Self::RenameDirectory
                | Self::UploadFile
                | Self::RenameFile
                | Self::RemoveFile
        )
    }

    /// Whether the end user can fix this error by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::InvalidName
                | Self::DuplicateName
                | Self::UnsupportedImageType
                | Self::Validation
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::InvalidName => write!(f, "INVALID_NAME"),
            Self::DuplicateName => write!(f, "DUPLICATE_NAME"),
            Self::CreateDirectory => write!(f, "CREATE_DIRECTORY"),
            Self::RemoveDirectory => write!(f, "REMOVE_DIRECTORY"),
            Self::RenameDirectory => write!(f, "RENAME_DIRECTORY"),
            Self::UploadFile => write!(f, "UPLOAD_FILE"),
            Self::RenameFile => write!(f, "RENAME_FILE"),
            Self::RemoveFile => write!(f, "REMOVE_FILE"),
            Self::UnsupportedImageType => write!(f, "UNSUPPORTED_IMAGE_TYPE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Image => write!(f, "IMAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout mediadesk.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create an invalid-name error.
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidName, message)
    }

    /// Create a duplicate-name error for a colliding path.
    pub fn duplicate_name(path: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateName,
            format!("An entry with path '{path}' already exists"),
        )
    }

    /// Create a directory-creation error.
    pub fn create_directory(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorKind::CreateDirectory,
            format!("Directory '{}' {reason}", path.display()),
        )
    }

    /// Create a directory-removal error.
    pub fn remove_directory(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorKind::RemoveDirectory,
            format!("Directory '{}' {reason}", path.display()),
        )
    }

    /// Create a directory-rename error.
    pub fn rename_directory(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorKind::RenameDirectory,
            format!("Directory '{}' {reason}", path.display()),
        )
    }

    /// Create an upload error.
    pub fn upload_file(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorKind::UploadFile,
            format!("Upload to '{}' failed: {reason}", path.display()),
        )
    }

    /// Create a file-rename error.
    pub fn rename_file(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorKind::RenameFile,
            format!("File '{}' {reason}", path.display()),
        )
    }

    /// Create a file-removal error.
    pub fn remove_file(path: &Path, reason: &str) -> Self {
        Self::new(
            ErrorKind::RemoveFile,
            format!("File '{}' {reason}", path.display()),
        )
    }

    /// Create an unsupported-image-type error.
    pub fn unsupported_image_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedImageType, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach an underlying cause to an existing error.
    pub fn caused_by(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        Self::with_source(ErrorKind::Image, format!("Image error: {err}"), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_state_family() {
        assert!(ErrorKind::CreateDirectory.is_filesystem_state());
        assert!(ErrorKind::RemoveFile.is_filesystem_state());
        assert!(!ErrorKind::DuplicateName.is_filesystem_state());
        assert!(!ErrorKind::PermissionDenied.is_filesystem_state());
    }

    #[test]
    fn test_user_correctable() {
        assert!(ErrorKind::InvalidName.is_user_correctable());
        assert!(ErrorKind::UnsupportedImageType.is_user_correctable());
        assert!(!ErrorKind::RenameFile.is_user_correctable());
    }

    #[test]
    fn test_display_includes_kind_and_path() {
        let err = AppError::remove_file(Path::new("/srv/media/a.jpg"), "does not exist");
        assert_eq!(err.kind, ErrorKind::RemoveFile);
        assert_eq!(
            err.to_string(),
            "REMOVE_FILE: File '/srv/media/a.jpg' does not exist"
        );
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: AppError = io.into();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(err.source.is_some());
    }
}
