//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use tracing::info;

use mediadesk_core::AppResult;
use mediadesk_core::config::AppConfig;
use mediadesk_database::EntryStore;
use mediadesk_entity::PermissionPolicy;
use mediadesk_service::{BrowserService, EntryService, MediaLinks, MediaService, UploadService};
use mediadesk_storage::{ImageCacheResolver, StorageRoots, StorageSynchronizer};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Permission rules handed to every request context.
    pub policy: PermissionPolicy,
    /// Entry metadata service.
    pub entry_service: Arc<EntryService>,
    /// Upload service.
    pub upload_service: Arc<UploadService>,
    /// Raw file and image delivery.
    pub media_service: Arc<MediaService>,
    /// Browser listing and tree.
    pub browser_service: Arc<BrowserService>,
    /// Public URL builder.
    pub links: Arc<MediaLinks>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires storage, the entry store and all services from configuration.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let roots = StorageRoots::from_config(&config.storage);
        roots.prepare().await?;

        let images = Arc::new(ImageCacheResolver::new(&roots, &config.images));
        let synchronizer = Arc::new(StorageSynchronizer::new(roots.clone(), Arc::clone(&images)));
        let store = Arc::new(EntryStore::open(&config.database, synchronizer).await?);
        let entries = store.read(|tree| tree.len()).await;
        info!(entries, "Entry store ready");

        let links = MediaLinks::from_config(&config.storage, &config.images);
        let policy = PermissionPolicy::from(&config.permissions);

        Ok(Self {
            entry_service: Arc::new(EntryService::new(Arc::clone(&store))),
            upload_service: Arc::new(UploadService::new(
                Arc::clone(&store),
                roots.clone(),
                config.storage.clone(),
            )),
            media_service: Arc::new(MediaService::new(Arc::clone(&store), roots, images)),
            browser_service: Arc::new(BrowserService::new(Arc::clone(&store), links.clone())),
            links: Arc::new(links),
            policy,
            config: Arc::new(config),
        })
    }
}
