//! Configurable parts of the permission model.

use serde::{Deserialize, Serialize};

use mediadesk_core::config::{PermissionConfig, WriteGrantSource};

/// Rules that parameterize [`can_read`](super::can_read) and
/// [`can_write`](super::can_write).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPolicy {
    /// Role that bypasses protection and ownership.
    pub admin_role: String,
    /// Grant set consulted for non-author writes on owned entries.
    pub write_grant_source: WriteGrantSource,
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self::from(&PermissionConfig::default())
    }
}

impl From<&PermissionConfig> for PermissionPolicy {
    fn from(config: &PermissionConfig) -> Self {
        Self {
            admin_role: config.admin_role.clone(),
            write_grant_source: config.write_grant_source,
        }
    }
}
