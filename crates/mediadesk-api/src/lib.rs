//! # mediadesk-api
//!
//! HTTP layer for mediadesk built on Axum.
//!
//! Serves stored media and cached image variants under the public URL,
//! and exposes the browser, entry management, upload, move and delete
//! endpoints under `/api`.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
