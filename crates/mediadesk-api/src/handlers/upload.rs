//! Multipart uploads.

use axum::Json;
use axum::extract::{Multipart, Path, State};

use mediadesk_core::AppError;
use mediadesk_core::types::DirId;
use mediadesk_service::{UploadItem, UploadReport, UploadedFile};

use crate::dto::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Caller, parse_dir_id, parse_file_id};
use crate::state::AppState;

/// POST /api/files/upload
///
/// Multipart fields: an optional `directory` id (root when absent or empty)
/// and any number of file parts. Each file is stored independently; the
/// report lists successes and failures.
pub async fn upload_files(
    State(state): State<AppState>,
    caller: Caller,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadReport>>, ApiError> {
    let (directory, items) = read_form(multipart).await?;
    let report = state
        .upload_service
        .upload_batch(&caller, directory, items)
        .await;
    Ok(Json(ApiResponse::ok(report)))
}

/// PUT /api/files/{id}/payload
///
/// Replaces the content of an existing file with the single file part.
pub async fn replace_payload(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadedFile>>, ApiError> {
    let id = parse_file_id(&id)?;
    let (_, mut items) = read_form(multipart).await?;
    let item = match (items.pop(), items.is_empty()) {
        (Some(item), true) => item,
        _ => return Err(AppError::validation("Exactly one file part is required").into()),
    };
    let uploaded = state.upload_service.replace(&caller, id, item).await?;
    Ok(Json(ApiResponse::ok(uploaded)))
}

async fn read_form(mut multipart: Multipart) -> Result<(Option<DirId>, Vec<UploadItem>), AppError> {
    let mut directory = None;
    let mut items = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if let Some(file_name) = field.file_name().map(String::from) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
            items.push(UploadItem { file_name, data });
            continue;
        }

        if field.name() == Some("directory") {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
            let text = text.trim();
            if !text.is_empty() {
                directory = Some(parse_dir_id(text.trim_start_matches("d:"))?);
            }
        }
    }

    if items.is_empty() {
        return Err(AppError::validation("No file uploaded"));
    }
    Ok((directory, items))
}
