//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section has defaults so an empty file is valid.

pub mod app;
pub mod database;
pub mod images;
pub mod logging;
pub mod permissions;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::database::DatabaseConfig;
pub use self::images::ImageConfig;
pub use self::logging::LoggingConfig;
pub use self::permissions::{PermissionConfig, WriteGrantSource};
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Physical storage roots.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Image derivative settings.
    #[serde(default)]
    pub images: ImageConfig,
    /// Authorization rules.
    #[serde(default)]
    pub permissions: PermissionConfig,
    /// Entry store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `MEDIADESK`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MEDIADESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.images.cache_dir, "_cache");
        assert_eq!(config.images.jpeg_quality, 90);
        assert_eq!(config.images.max_dimension, 4096);
        assert_eq!(config.permissions.admin_role, "admin");
        assert_eq!(config.permissions.write_grant_source, WriteGrantSource::Read);
        assert!(config.database.snapshot_path.is_none());
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [storage]
            public_dir = "/srv/www/media"
            protected_dir = "/srv/data/media"

            [permissions]
            write_grant_source = "write"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.storage.public_dir, "/srv/www/media");
        assert_eq!(config.storage.protected_dir, "/srv/data/media");
        assert_eq!(config.storage.public_url, "/public/media");
        assert_eq!(
            config.permissions.write_grant_source,
            WriteGrantSource::Write
        );
    }
}
