//! Directory and entry management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use mediadesk_database::CommitSummary;
use mediadesk_service::{CreateDirectoryRequest, EntryInfo, MoveRequest, UpdateEntryRequest};

use crate::dto::{ApiResponse, CopyPermissionRequest, SetAuthorRequest};
use crate::error::ApiError;
use crate::extractors::{Caller, parse_dir_id, parse_key};
use crate::state::AppState;

type EntryResponse = Json<ApiResponse<EntryInfo>>;

/// GET /api/entries/{key}
pub async fn get_entry(
    State(state): State<AppState>,
    caller: Caller,
    Path(key): Path<String>,
) -> Result<EntryResponse, ApiError> {
    let info = state.entry_service.get(&caller, parse_key(&key)?).await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// POST /api/directories
pub async fn create_directory(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateDirectoryRequest>,
) -> Result<(StatusCode, EntryResponse), ApiError> {
    let info = state.entry_service.create_directory(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(info))))
}

/// PATCH /api/entries/{key}
pub async fn update_entry(
    State(state): State<AppState>,
    caller: Caller,
    Path(key): Path<String>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<EntryResponse, ApiError> {
    let info = state
        .entry_service
        .update(&caller, parse_key(&key)?, req)
        .await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// PUT /api/entries/{key}/author
pub async fn set_author(
    State(state): State<AppState>,
    caller: Caller,
    Path(key): Path<String>,
    Json(req): Json<SetAuthorRequest>,
) -> Result<EntryResponse, ApiError> {
    let info = state
        .entry_service
        .set_author(&caller, parse_key(&key)?, req.author_id)
        .await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// POST /api/entries/{key}/permissions/copy
pub async fn copy_permission(
    State(state): State<AppState>,
    caller: Caller,
    Path(key): Path<String>,
    Json(req): Json<CopyPermissionRequest>,
) -> Result<EntryResponse, ApiError> {
    let info = state
        .entry_service
        .copy_permission(&caller, parse_key(&key)?, req.source)
        .await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// POST /api/directories/{id}/propagate
pub async fn propagate(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CommitSummary>>, ApiError> {
    let summary = state
        .entry_service
        .propagate(&caller, parse_dir_id(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// POST /api/entries/move
pub async fn move_entry(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<MoveRequest>,
) -> Result<EntryResponse, ApiError> {
    let info = state.entry_service.move_entry(&caller, req).await?;
    Ok(Json(ApiResponse::ok(info)))
}

/// DELETE /api/entries/{key}
pub async fn delete_entry(
    State(state): State<AppState>,
    caller: Caller,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<CommitSummary>>, ApiError> {
    let summary = state.entry_service.delete(&caller, parse_key(&key)?).await?;
    Ok(Json(ApiResponse::ok(summary)))
}
