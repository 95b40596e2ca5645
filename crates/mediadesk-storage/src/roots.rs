//! Storage roots and the upload staging area.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use mediadesk_core::config::StorageConfig;
use mediadesk_core::{AppError, AppResult, ErrorKind};

/// The public and protected mirrors plus the staging directory.
#[derive(Debug, Clone)]
pub struct StorageRoots {
    public: PathBuf,
    protected: PathBuf,
    staging: PathBuf,
}

impl StorageRoots {
    /// Create roots from explicit paths.
    pub fn new(
        public: impl Into<PathBuf>,
        protected: impl Into<PathBuf>,
        staging: impl Into<PathBuf>,
    ) -> Self {
        Self {
            public: public.into(),
            protected: protected.into(),
            staging: staging.into(),
        }
    }

    /// Create roots from configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.public_dir, &config.protected_dir, &config.upload_dir)
    }

    /// Create all three directories if they are missing.
    pub async fn prepare(&self) -> AppResult<()> {
        for dir in [&self.public, &self.protected, &self.staging] {
            fs::create_dir_all(dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create storage root: {}", dir.display()),
                    e,
                )
            })?;
        }
        info!(
            public = %self.public.display(),
            protected = %self.protected.display(),
            staging = %self.staging.display(),
            "Storage roots ready"
        );
        Ok(())
    }

    /// The web-servable root.
    pub fn public(&self) -> &Path {
        &self.public
    }

    /// The access-gated root.
    pub fn protected(&self) -> &Path {
        &self.protected
    }

    /// The upload staging directory.
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// The root backing entries with the given protection flag.
    pub fn root_for(&self, protected: bool) -> &Path {
        if protected {
            self.protected.as_path()
        } else {
            self.public.as_path()
        }
    }

    /// Both roots, public first.
    pub fn mirrors(&self) -> [&Path; 2] {
        [self.public.as_path(), self.protected.as_path()]
    }

    /// Physical location of a logical path.
    pub fn resolve(&self, protected: bool, logical: &str) -> PathBuf {
        self.root_for(protected).join(logical.trim_start_matches('/'))
    }

    /// Whether `basename` exists inside `parent` in either root.
    pub async fn is_taken(&self, parent: Option<&str>, basename: &str) -> bool {
        let relative = match parent {
            Some(parent) => format!("{parent}/{basename}"),
            None => basename.to_string(),
        };
        for root in self.mirrors() {
            if exists(&root.join(&relative)).await {
                return true;
            }
        }
        false
    }

    /// Write raw upload bytes into the staging directory.
    pub async fn stage_upload(&self, data: &[u8]) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.staging).await?;
        let path = self.staging.join(format!("{}.upload", Uuid::new_v4()));
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stage upload: {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), bytes = data.len(), "Upload staged");
        Ok(path)
    }

    /// Remove a staged upload if it is still there.
    pub async fn discard_staged(&self, path: &Path) {
        if exists(path).await {
            if let Err(e) = fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
            }
        }
    }
}

pub(crate) async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

pub(crate) async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

pub(crate) async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
