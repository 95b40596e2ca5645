//! Raw file and image variant delivery with read checks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use mediadesk_core::{AppError, AppResult, ErrorKind};
use mediadesk_database::EntryStore;
use mediadesk_entity::EntryKey;
use mediadesk_storage::mime::detect_mime;
use mediadesk_storage::{ImageCacheResolver, ImageOrigin, ImageRequest, ImageType, StorageRoots};

use crate::context::RequestContext;

/// File content ready to be sent to a client.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Suggested file name for Content-Disposition.
    pub file_name: String,
    /// MIME type for Content-Type.
    pub mime_type: String,
    /// File content bytes.
    pub data: Bytes,
    /// How an image variant was obtained; `None` for raw downloads.
    pub origin: Option<ImageOrigin>,
}

struct Located {
    physical: PathBuf,
    logical: String,
    file_name: String,
    mime_type: Option<String>,
}

/// Serves stored files by logical path.
#[derive(Debug, Clone)]
pub struct MediaService {
    /// Entry store.
    store: Arc<EntryStore>,
    /// Storage roots.
    roots: StorageRoots,
    /// Image derivative cache.
    images: Arc<ImageCacheResolver>,
}

impl MediaService {
    /// Creates a new media service.
    pub fn new(store: Arc<EntryStore>, roots: StorageRoots, images: Arc<ImageCacheResolver>) -> Self {
        Self {
            store,
            roots,
            images,
        }
    }

    /// Reads a file by logical path.
    pub async fn download(&self, ctx: &RequestContext, path: &str) -> AppResult<MediaFile> {
        let located = self.locate(ctx, path).await?;
        let data = read(&located.physical, &located.logical).await?;
        let mime_type = match located.mime_type {
            Some(mime) => mime,
            None => detect_mime(&located.physical).await,
        };
        Ok(MediaFile {
            file_name: located.file_name,
            mime_type,
            data,
            origin: None,
        })
    }

    /// Reads an image variant by logical path, generating it on a cache miss.
    pub async fn image(
        &self,
        ctx: &RequestContext,
        path: &str,
        request: &ImageRequest,
    ) -> AppResult<MediaFile> {
        ImageType::from_path(path)?;
        let located = self.locate(ctx, path).await?;
        let resolved = self
            .images
            .resolve(&located.physical, &located.logical, request)
            .await?;
        debug!(path = %located.logical, origin = ?resolved.origin, "Image variant resolved");

        Ok(MediaFile {
            file_name: located.file_name,
            mime_type: resolved.content_type.to_string(),
            data: read(&resolved.path, &located.logical).await?,
            origin: Some(resolved.origin),
        })
    }

    async fn locate(&self, ctx: &RequestContext, path: &str) -> AppResult<Located> {
        let access = ctx.access();
        self.store
            .read(|tree| -> AppResult<Located> {
                let id = match tree.key_by_path(path) {
                    Some(EntryKey::File(id)) => id,
                    _ => return Err(AppError::not_found(format!("File not found: {path}"))),
                };
                let file = tree.file(&access, id)?;
                Ok(Located {
                    physical: self.roots.resolve(file.meta.protected, &file.meta.path),
                    logical: file.meta.path.clone(),
                    file_name: file.meta.basename().to_string(),
                    mime_type: file.mime_type.clone(),
                })
            })
            .await
    }
}

async fn read(physical: &Path, logical: &str) -> AppResult<Bytes> {
    match tokio::fs::read(physical).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::not_found(format!("File not found: {logical}")))
        }
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to read {}", physical.display()),
            e,
        )),
    }
}
