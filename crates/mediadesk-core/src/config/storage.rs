//! Physical storage configuration.

use serde::{Deserialize, Serialize};

/// Locations of the two mirrored storage roots and the upload staging area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Web-servable root for unprotected entries (also hosts the image cache).
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// Access-gated root for protected entries.
    #[serde(default = "default_protected_dir")]
    pub protected_dir: String,
    /// Scratch directory where raw uploads land before adoption.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// URL prefix under which the public root is served.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Maximum upload size in bytes (default 64 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            protected_dir: default_protected_dir(),
            upload_dir: default_upload_dir(),
            public_url: default_public_url(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_public_dir() -> String {
    "./www/public/media".to_string()
}

fn default_protected_dir() -> String {
    "./data/media".to_string()
}

fn default_upload_dir() -> String {
    "./www/public/ajaxFileUpload".to_string()
}

fn default_public_url() -> String {
    "/public/media".to_string()
}

fn default_max_upload() -> u64 {
    67_108_864 // 64 MB
}
