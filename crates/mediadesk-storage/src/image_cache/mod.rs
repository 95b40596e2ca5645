//! On-demand image derivatives cached under the public root.
//!
//! Layout: `{public}/{cache_dir}/{size}/{format}/{type}/{logical path}`.

pub mod params;
pub mod render;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use mediadesk_core::config::ImageConfig;
use mediadesk_core::{AppError, AppResult, ErrorKind};

pub use params::{FitMode, ImageRequest, ImageSize, ImageType};
pub use render::RenderLimits;

use crate::roots::{is_file, StorageRoots};

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// The untouched source file.
    Original,
    /// A previously generated derivative.
    CacheHit,
    /// A derivative generated by this call.
    Generated,
}

/// A resolved image ready to be served.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// Physical file to serve.
    pub path: PathBuf,
    /// MIME type of the file.
    pub content_type: &'static str,
    /// How the file was obtained.
    pub origin: ImageOrigin,
}

/// Resolves, generates and purges cached image derivatives.
#[derive(Debug, Clone)]
pub struct ImageCacheResolver {
    cache_root: PathBuf,
    limits: RenderLimits,
}

impl ImageCacheResolver {
    /// Create a resolver whose cache lives under the public root.
    pub fn new(roots: &StorageRoots, config: &ImageConfig) -> Self {
        Self {
            cache_root: roots.public().join(&config.cache_dir),
            limits: RenderLimits {
                jpeg_quality: config.jpeg_quality,
                max_dimension: config.max_dimension,
            },
        }
    }

    /// The cache namespace directory.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Physical cache location of a derivative.
    pub fn cache_path(&self, logical_path: &str, request: &ImageRequest) -> PathBuf {
        let [size, format, image_type] = request.segments();
        self.cache_root
            .join(size)
            .join(format)
            .join(image_type)
            .join(logical_path.trim_start_matches('/'))
    }

    /// Resolve `request` for the source stored at `source`.
    ///
    /// The source extension, the requested type and the size limit are
    /// validated before any disk access. A passthrough request returns the
    /// source itself; other requests reuse a cached derivative or generate
    /// one.
    pub async fn resolve(
        &self,
        source: &Path,
        logical_path: &str,
        request: &ImageRequest,
    ) -> AppResult<ResolvedImage> {
        let source_type = ImageType::from_path(logical_path)?;
        request.size.ensure_within(self.limits.max_dimension)?;
        let output = request.output_for(source_type);

        if request.is_passthrough(source_type) {
            return Ok(ResolvedImage {
                path: source.to_path_buf(),
                content_type: source_type.mime_type(),
                origin: ImageOrigin::Original,
            });
        }

        let target = self.cache_path(logical_path, request);
        if is_file(&target).await {
            debug!(path = %target.display(), "Image cache hit");
            return Ok(ResolvedImage {
                path: target,
                content_type: output.mime_type(),
                origin: ImageOrigin::CacheHit,
            });
        }

        let data = tokio::fs::read(source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Image source not found: {logical_path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read image source: {}", source.display()),
                    e,
                )
            }
        })?;

        let (size, fit, limits) = (request.size, request.fit.unwrap_or_default(), self.limits);
        let encoded = tokio::task::spawn_blocking(move || {
            render::render(&data, size, fit, output, limits)
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Image task panicked", e))??;

        self.write_atomically(&target, &encoded).await?;
        info!(
            source = %logical_path,
            cache = %target.display(),
            bytes = encoded.len(),
            "Image derivative generated"
        );

        Ok(ResolvedImage {
            path: target,
            content_type: output.mime_type(),
            origin: ImageOrigin::Generated,
        })
    }

    async fn write_atomically(&self, target: &Path, data: &[u8]) -> AppResult<()> {
        let parent = target
            .parent()
            .ok_or_else(|| AppError::internal("Cache path has no parent"))?;
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create cache directory: {}", parent.display()),
                e,
            )
        })?;

        let tmp = parent.join(format!(".{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to publish cache file: {}", target.display()),
                e,
            ));
        }
        Ok(())
    }

    /// Remove every cached derivative whose file name equals `basename`,
    /// across all size/format/type combinations. Returns the number of
    /// removed files.
    pub async fn purge(&self, basename: &str) -> AppResult<usize> {
        let root = self.cache_root.clone();
        let basename = basename.to_string();

        let removed = tokio::task::spawn_blocking(move || purge_blocking(&root, &basename))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Cache purge task panicked", e))?;

        if removed > 0 {
            info!(removed, "Image cache purged");
        }
        Ok(removed)
    }

    /// Remove the derivatives cached for one logical path, across all
    /// size/format/type combinations. Returns the number of removed files.
    pub async fn purge_path(&self, logical_path: &str) -> AppResult<usize> {
        let root = self.cache_root.clone();
        let relative = logical_path.trim_start_matches('/').to_string();

        let removed = tokio::task::spawn_blocking(move || purge_path_blocking(&root, &relative))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Cache purge task panicked", e))?;

        if removed > 0 {
            debug!(path = %logical_path, removed, "Cached derivatives invalidated");
        }
        Ok(removed)
    }
}

fn purge_path_blocking(root: &Path, relative: &str) -> usize {
    if !root.is_dir() || relative.is_empty() {
        return 0;
    }
    let mut removed = 0;
    let variants = WalkDir::new(root).min_depth(3).max_depth(3).into_iter().filter_map(Result::ok);
    for variant in variants.filter(|e| e.file_type().is_dir()) {
        let cached = variant.path().join(relative);
        if !cached.is_file() {
            continue;
        }
        match std::fs::remove_file(&cached) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %cached.display(), error = %e, "Failed to purge cache file"),
        }
    }
    removed
}

fn purge_blocking(root: &Path, basename: &str) -> usize {
    if !root.is_dir() {
        return 0;
    }
    let mut removed = 0;
    // size/format/type make up the first three levels
    for entry in WalkDir::new(root).min_depth(4).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() || entry.file_name().to_str() != Some(basename) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to purge cache file"),
        }
    }
    removed
}
