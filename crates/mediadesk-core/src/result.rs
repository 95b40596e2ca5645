//! Convenience result type alias for mediadesk.

use crate::error::AppError;

/// A specialized `Result` type for mediadesk operations.
pub type AppResult<T> = Result<T, AppError>;
