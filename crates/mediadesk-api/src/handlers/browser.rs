//! File browser listing and tree.

use axum::Json;
use axum::extract::{Query, State};

use mediadesk_service::{BrowserListing, TreeNode};

use crate::dto::{ApiResponse, ListQuery, TreeQuery};
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::state::AppState;

/// GET /api/browser?dir={id}
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<BrowserListing>>, ApiError> {
    let listing = state.browser_service.list(&caller, query.dir).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// GET /api/browser/tree?parent={key}&expanded={id,id}
pub async fn tree(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<TreeQuery>,
) -> Result<Json<ApiResponse<Vec<TreeNode>>>, ApiError> {
    let parent = query.parent_dir()?;
    let expanded = query.expanded_set()?;
    let nodes = state.browser_service.tree(&caller, parent, &expanded).await?;
    Ok(Json(ApiResponse::ok(nodes)))
}
