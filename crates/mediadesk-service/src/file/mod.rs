//! File services: batch upload, raw and image delivery, media URLs.

pub mod links;
pub mod media;
pub mod upload;

pub use links::MediaLinks;
pub use media::{MediaFile, MediaService};
pub use upload::{UploadFailure, UploadItem, UploadReport, UploadService, UploadedFile};
