//! Image derivative configuration.

use serde::{Deserialize, Serialize};

/// Settings for the on-demand image cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Name of the cache namespace directory under the public root.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// JPEG encoding quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Largest width or height a derivative may have, in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            jpeg_quality: default_jpeg_quality(),
            max_dimension: default_max_dimension(),
        }
    }
}

fn default_cache_dir() -> String {
    "_cache".to_string()
}

fn default_jpeg_quality() -> u8 {
    90
}

fn default_max_dimension() -> u32 {
    4096
}
