//! # mediadesk-storage
//!
//! Keeps the two physical mirrors of the logical tree (public and protected
//! roots) in step with committed entry changes, and serves resized image
//! derivatives from a disk cache under the public root.

pub mod image_cache;
pub mod mime;
pub mod naming;
pub mod roots;
pub mod sync;

pub use image_cache::{
    FitMode, ImageCacheResolver, ImageOrigin, ImageRequest, ImageSize, ImageType, ResolvedImage,
};
pub use naming::suggest_name;
pub use roots::StorageRoots;
pub use sync::StorageSynchronizer;
