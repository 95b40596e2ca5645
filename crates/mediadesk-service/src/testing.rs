//! Shared fixtures for service tests.

use std::io::Cursor;
use std::sync::Arc;

use mediadesk_core::config::ImageConfig;
use mediadesk_core::types::UserId;
use mediadesk_database::EntryStore;
use mediadesk_entity::{PermissionPolicy, Principal};
use mediadesk_storage::{ImageCacheResolver, StorageRoots, StorageSynchronizer};

use crate::context::RequestContext;

pub(crate) struct Harness {
    pub _tmp: tempfile::TempDir,
    pub roots: StorageRoots,
    pub images: Arc<ImageCacheResolver>,
    pub store: Arc<EntryStore>,
}

pub(crate) async fn harness() -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let roots = StorageRoots::new(
        tmp.path().join("public"),
        tmp.path().join("protected"),
        tmp.path().join("staging"),
    );
    roots.prepare().await.unwrap();
    let images = Arc::new(ImageCacheResolver::new(&roots, &ImageConfig::default()));
    let sync = Arc::new(StorageSynchronizer::new(roots.clone(), images.clone()));
    Harness {
        store: Arc::new(EntryStore::in_memory(sync)),
        roots,
        images,
        _tmp: tmp,
    }
}

pub(crate) fn admin() -> RequestContext {
    user(&["admin"])
}

pub(crate) fn user(roles: &[&str]) -> RequestContext {
    RequestContext::new(
        Some(Principal::new(UserId::new(), roles.iter().copied())),
        PermissionPolicy::default(),
    )
}

pub(crate) fn anonymous() -> RequestContext {
    RequestContext::anonymous(PermissionPolicy::default())
}

pub(crate) fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

pub(crate) async fn upload(
    h: &Harness,
    ctx: &RequestContext,
    parent: Option<mediadesk_core::types::DirId>,
    name: &str,
    body: &[u8],
) -> mediadesk_core::types::FileId {
    let staged_path = h.roots.stage_upload(body).await.unwrap();
    let access = ctx.access();
    let mut tx = h.store.begin(access.clone()).await;
    let payload = mediadesk_entity::PendingPayload::Upload {
        staged_path,
        original_name: name.to_string(),
    };
    let id = tx.tree_mut().create_file(&access, parent, payload).unwrap();
    tx.commit().await.unwrap();
    id
}
