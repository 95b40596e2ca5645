//! Request context carrying the acting principal.

use chrono::{DateTime, Utc};

use mediadesk_core::types::UserId;
use mediadesk_entity::{AccessContext, PermissionPolicy, Principal};

/// Context for the current request.
///
/// Built by the HTTP layer and passed into service methods so that every
/// operation knows who is acting and under which permission policy.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The acting principal, `None` for anonymous requests.
    pub principal: Option<Principal>,
    /// Permission rules in effect.
    pub policy: PermissionPolicy,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Option<Principal>, policy: PermissionPolicy) -> Self {
        Self {
            principal,
            policy,
            request_time: Utc::now(),
        }
    }

    /// Creates a context for an unauthenticated request.
    pub fn anonymous(policy: PermissionPolicy) -> Self {
        Self::new(None, policy)
    }

    /// The acting user's ID, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.principal.as_ref().map(|p| p.user_id)
    }

    /// Returns whether the acting user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.principal
            .as_ref()
            .is_some_and(|p| p.has_role(&self.policy.admin_role))
    }

    /// The permission view handed to the entity layer.
    pub fn access(&self) -> AccessContext {
        AccessContext::new(self.principal.clone(), self.policy.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_detection_follows_policy() {
        let principal = Principal::new(UserId::new(), ["editor", "admin"]);
        let ctx = RequestContext::new(Some(principal), PermissionPolicy::default());
        assert!(ctx.is_admin());
        assert!(ctx.user_id().is_some());

        let policy = PermissionPolicy {
            admin_role: "root".to_string(),
            ..PermissionPolicy::default()
        };
        let ctx = RequestContext::new(Some(Principal::new(UserId::new(), ["admin"])), policy);
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = RequestContext::anonymous(PermissionPolicy::default());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.user_id(), None);
        assert!(ctx.access().principal().is_none());
    }
}
