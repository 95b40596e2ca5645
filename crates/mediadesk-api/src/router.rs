//! Route definitions for the mediadesk HTTP surface.
//!
//! Stored media is served under the configured public URL; management
//! endpoints are mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes).unwrap_or(usize::MAX);
    let media_route = format!("{}/{{*url}}", state.config.storage.public_url.trim_end_matches('/'));

    let api_routes = Router::new()
        .merge(browser_routes())
        .merge(entry_routes())
        .merge(upload_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .route(&media_route, get(handlers::media::serve))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Directory listing and lazy tree
fn browser_routes() -> Router<AppState> {
    Router::new()
        .route("/browser", get(handlers::browser::list))
        .route("/browser/tree", get(handlers::browser::tree))
}

/// Directory creation, entry updates, moves and deletes
fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/directories", post(handlers::entry::create_directory))
        .route("/directories/{id}/propagate", post(handlers::entry::propagate))
        .route("/entries/move", post(handlers::entry::move_entry))
        .route(
            "/entries/{key}",
            get(handlers::entry::get_entry)
                .patch(handlers::entry::update_entry)
                .delete(handlers::entry::delete_entry),
        )
        .route("/entries/{key}/author", put(handlers::entry::set_author))
        .route(
            "/entries/{key}/permissions/copy",
            post(handlers::entry::copy_permission),
        )
}

/// Multipart uploads
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/files/upload", post(handlers::upload::upload_files))
        .route("/files/{id}/payload", put(handlers::upload::replace_payload))
}
