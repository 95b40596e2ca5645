//! Request logging.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

use crate::extractors::caller::USER_ID_HEADER;

/// Logs method, path, forwarded user, status and duration of every request.
/// Server errors are logged at `warn`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let user = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    if status.is_server_error() {
        warn!(%method, %path, %user, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        info!(%method, %path, %user, status = status.as_u16(), elapsed_ms, "Request served");
    }

    response
}
