//! Request handlers, one module per area.

pub mod browser;
pub mod entry;
pub mod health;
pub mod media;
pub mod upload;
