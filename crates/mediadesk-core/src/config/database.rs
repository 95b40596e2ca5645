//! Entry store configuration.

use serde::{Deserialize, Serialize};

/// Entry store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When set, committed state is persisted to this JSON file and loaded
    /// back on startup.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}
