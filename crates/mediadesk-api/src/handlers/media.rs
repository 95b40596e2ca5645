//! Public media delivery: raw files and image variants.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use mediadesk_core::AppError;
use mediadesk_service::MediaFile;
use mediadesk_storage::ImageRequest;
use mediadesk_storage::image_cache::params::DEFAULT_TOKEN;

use crate::dto::ImageQuery;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::state::AppState;

/// GET /public/media/{*url}
///
/// `{cache_dir}/{size}/{format}/{type}/{path}` URLs resolve an image
/// variant, as do plain URLs carrying `size`/`format`/`type` query
/// parameters. Everything else is served as stored.
pub async fn serve(
    State(state): State<AppState>,
    caller: Caller,
    Path(url): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let cache_prefix = format!("{}/", state.config.images.cache_dir);

    let file = if let Some(rest) = url.strip_prefix(&cache_prefix) {
        let mut parts = rest.splitn(4, '/');
        let (Some(size), Some(format), Some(image_type), Some(path)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::not_found(format!("Unknown media URL: {url}")).into());
        };
        let request = ImageRequest::parse(size, format, image_type)?;
        state.media_service.image(&caller, path, &request).await?
    } else if !query.is_empty() {
        let request = ImageRequest::parse(
            query.size.as_deref().unwrap_or(DEFAULT_TOKEN),
            query.format.as_deref().unwrap_or(DEFAULT_TOKEN),
            query.image_type.as_deref().unwrap_or(DEFAULT_TOKEN),
        )?;
        state.media_service.image(&caller, &url, &request).await?
    } else {
        state.media_service.download(&caller, &url).await?
    };

    file_response(file)
}

fn file_response(file: MediaFile) -> Result<Response, ApiError> {
    let cache_control = if file.origin.is_some() {
        "public, max-age=3600"
    } else {
        "no-cache"
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", file.file_name),
        )
        .header(header::CONTENT_LENGTH, file.data.len())
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(file.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}
