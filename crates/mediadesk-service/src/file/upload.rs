//! Batch upload with per-file outcomes.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info, warn};

use mediadesk_core::config::StorageConfig;
use mediadesk_core::types::{DirId, FileId};
use mediadesk_core::{AppError, AppResult, ErrorKind};
use mediadesk_database::EntryStore;
use mediadesk_entity::PendingPayload;
use mediadesk_storage::StorageRoots;

use crate::context::RequestContext;

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// File name as sent by the client.
    pub file_name: String,
    /// File content bytes.
    pub data: Bytes,
}

/// A file that landed in the tree.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    /// File name as sent by the client.
    pub original_name: String,
    /// The new file's ID.
    pub file_id: FileId,
    /// Final logical path, after collision renaming.
    pub path: String,
    /// Stored size in bytes.
    pub size_bytes: u64,
    /// Detected MIME type.
    pub mime_type: Option<String>,
}

/// A file that was rejected.
#[derive(Debug, Clone, Serialize)]
pub struct UploadFailure {
    /// File name as sent by the client.
    pub original_name: String,
    /// Category of the failure.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub message: String,
}

/// Outcome of a batch upload. One failing file never blocks the others.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    /// Files stored successfully.
    pub uploaded: Vec<UploadedFile>,
    /// Files that failed, with their reason.
    pub errors: Vec<UploadFailure>,
}

impl UploadReport {
    /// Whether every file in the batch was stored.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Stages uploads and adopts them into the tree one commit per file.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Entry store.
    store: Arc<EntryStore>,
    /// Storage roots, for the staging directory.
    roots: StorageRoots,
    /// Storage configuration.
    config: StorageConfig,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(store: Arc<EntryStore>, roots: StorageRoots, config: StorageConfig) -> Self {
        Self {
            store,
            roots,
            config,
        }
    }

    /// Uploads every item into `parent`, collecting per-file outcomes.
    pub async fn upload_batch(
        &self,
        ctx: &RequestContext,
        parent: Option<DirId>,
        items: Vec<UploadItem>,
    ) -> UploadReport {
        let mut report = UploadReport::default();
        for item in items {
            let original_name = item.file_name.clone();
            match self.upload(ctx, parent, item).await {
                Ok(uploaded) => report.uploaded.push(uploaded),
                Err(e) => {
                    warn!(file_name = %original_name, error = %e, "Upload rejected");
                    report.errors.push(UploadFailure {
                        original_name,
                        kind: e.kind,
                        message: e.message,
                    });
                }
            }
        }

        info!(
            user_id = ?ctx.user_id(),
            uploaded = report.uploaded.len(),
            failed = report.errors.len(),
            "Upload batch finished"
        );
        report
    }

    /// Uploads a single file into `parent`.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        parent: Option<DirId>,
        item: UploadItem,
    ) -> AppResult<UploadedFile> {
        let staged_path = self.stage(&item).await?;
        let payload = PendingPayload::Upload {
            staged_path: staged_path.clone(),
            original_name: item.file_name.clone(),
        };

        let access = ctx.access();
        let result = async {
            let mut tx = self.store.begin(access.clone()).await;
            let id = tx.tree_mut().create_file(&access, parent, payload)?;
            tx.commit().await?;
            Ok::<_, AppError>(id)
        }
        .await;

        self.roots.discard_staged(&staged_path).await;
        let id = result.inspect_err(|e| log_failure(e, &item.file_name))?;
        self.describe(item.file_name, id).await
    }

    /// Replaces the payload of an existing file. The stored name follows
    /// the new upload; the previous physical file is removed.
    pub async fn replace(
        &self,
        ctx: &RequestContext,
        id: FileId,
        item: UploadItem,
    ) -> AppResult<UploadedFile> {
        let staged_path = self.stage(&item).await?;
        let payload = PendingPayload::Upload {
            staged_path: staged_path.clone(),
            original_name: item.file_name.clone(),
        };

        let access = ctx.access();
        let result = async {
            let mut tx = self.store.begin(access.clone()).await;
            tx.tree_mut().set_file(&access, id, payload)?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        }
        .await;

        self.roots.discard_staged(&staged_path).await;
        result.inspect_err(|e| log_failure(e, &item.file_name))?;
        info!(file_id = %id, file_name = %item.file_name, "File payload replaced");
        self.describe(item.file_name, id).await
    }

    /// Copies a file already on the server's disk into `parent`. The source
    /// is left in place; its basename is normalized like an entry name.
    pub async fn import(
        &self,
        ctx: &RequestContext,
        parent: Option<DirId>,
        source_path: PathBuf,
    ) -> AppResult<UploadedFile> {
        let original_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::validation("Import source has no file name"))?;
        if !tokio::fs::metadata(&source_path).await.is_ok_and(|m| m.is_file()) {
            return Err(AppError::not_found(format!(
                "Import source not found: {}",
                source_path.display()
            )));
        }

        let access = ctx.access();
        let mut tx = self.store.begin(access.clone()).await;
        let id = tx
            .tree_mut()
            .create_file(&access, parent, PendingPayload::Existing { source_path })?;
        tx.commit()
            .await
            .inspect_err(|e| log_failure(e, &original_name))?;
        info!(file_id = %id, file_name = %original_name, "File imported");
        self.describe(original_name, id).await
    }

    async fn stage(&self, item: &UploadItem) -> AppResult<PathBuf> {
        if item.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        self.roots.stage_upload(&item.data).await
    }

    async fn describe(&self, original_name: String, id: FileId) -> AppResult<UploadedFile> {
        self.store
            .read(|tree| -> AppResult<UploadedFile> {
                let file = tree
                    .find_file(id)
                    .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
                Ok(UploadedFile {
                    original_name,
                    file_id: id,
                    path: file.meta.path.clone(),
                    size_bytes: file.size_bytes,
                    mime_type: file.mime_type.clone(),
                })
            })
            .await
    }
}

fn log_failure(e: &AppError, file_name: &str) {
    if e.kind.is_filesystem_state() {
        error!(file_name = %file_name, kind = %e.kind, error = %e.message, "Upload left storage inconsistent");
    }
}
