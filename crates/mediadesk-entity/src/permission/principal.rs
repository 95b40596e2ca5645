//! The acting user of a request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use mediadesk_core::types::UserId;

/// An authenticated principal with its role memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The user's identifier.
    pub user_id: UserId,
    /// Role identifiers the user belongs to.
    pub roles: BTreeSet<String>,
}

impl Principal {
    /// Create a principal from a user id and a list of roles.
    pub fn new<I, S>(user_id: UserId, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Check membership of a single role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Check whether the principal holds any role from `grants`.
    pub fn holds_any(&self, grants: &BTreeSet<String>) -> bool {
        !self.roles.is_disjoint(grants)
    }
}
