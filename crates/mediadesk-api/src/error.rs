//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use mediadesk_core::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// An `AppError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::InvalidName | ErrorKind::Validation | ErrorKind::UnsupportedImageType => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::DuplicateName => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;

        // Server-side failures are logged in full and reported generically.
        let message = if err.kind.is_filesystem_state() {
            tracing::error!(kind = %err.kind, error = %err.message, "Storage out of sync");
            "The operation could not be completed on storage".to_string()
        } else if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
            "Internal server error".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (AppError::permission_denied("x"), StatusCode::FORBIDDEN),
            (AppError::invalid_name("x"), StatusCode::BAD_REQUEST),
            (AppError::unsupported_image_type("x"), StatusCode::BAD_REQUEST),
            (AppError::duplicate_name("a"), StatusCode::CONFLICT),
            (
                AppError::rename_file(Path::new("/a"), "exists"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_filesystem_errors_are_reported_generically() {
        let err = AppError::remove_directory(Path::new("/srv/secret/dir"), "still exists");
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "REMOVE_DIRECTORY");
        assert!(!body.message.contains("/srv/secret"));
    }
}
