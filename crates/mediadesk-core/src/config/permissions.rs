//! Authorization configuration.

use serde::{Deserialize, Serialize};

/// Which grant set authorizes writes on owned entries for non-author,
/// non-admin principals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteGrantSource {
    /// Holders of a read grant may write. This is the historical behavior.
    #[default]
    Read,
    /// Only holders of a write grant may write.
    Write,
}

/// Authorization rules applied to every entry accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Role name that bypasses protection and ownership checks.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// Grant set consulted by the write check.
    #[serde(default)]
    pub write_grant_source: WriteGrantSource,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            write_grant_source: WriteGrantSource::default(),
        }
    }
}

fn default_admin_role() -> String {
    "admin".to_string()
}
