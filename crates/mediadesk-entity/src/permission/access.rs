//! Pure authorization functions and the per-request access context.
//!
//! Nothing is memoized: every check is recomputed from the entry's current
//! `protected` flag, author and grant sets together with the principal, so
//! a change to any of them is observed by the very next call.

use mediadesk_core::config::WriteGrantSource;
use mediadesk_core::{AppError, AppResult};

use crate::entry::EntryMeta;

use super::{PermissionPolicy, Principal};

/// Whether `principal` may read the entry described by `meta`.
///
/// Unprotected entries are readable by anyone. Protected entries require the
/// admin role or a role present in the read grants.
pub fn can_read(meta: &EntryMeta, principal: Option<&Principal>, policy: &PermissionPolicy) -> bool {
    if !meta.protected {
        return true;
    }
    match principal {
        Some(p) => p.has_role(&policy.admin_role) || p.holds_any(&meta.read_grants),
        None => false,
    }
}

/// Whether `principal` may modify the entry described by `meta`.
///
/// Unowned entries are writable by anyone. Owned entries are writable by the
/// author, an admin, or a holder of a grant from the set selected by
/// [`PermissionPolicy::write_grant_source`].
pub fn can_write(
    meta: &EntryMeta,
    principal: Option<&Principal>,
    policy: &PermissionPolicy,
) -> bool {
    let Some(author) = meta.author_id else {
        return true;
    };
    let Some(p) = principal else {
        return false;
    };
    if p.user_id == author || p.has_role(&policy.admin_role) {
        return true;
    }
    let grants = match policy.write_grant_source {
        WriteGrantSource::Read => &meta.read_grants,
        WriteGrantSource::Write => &meta.write_grants,
    };
    p.holds_any(grants)
}

/// The principal and policy in effect for one request.
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    principal: Option<Principal>,
    policy: PermissionPolicy,
}

impl AccessContext {
    /// Create a context for an optional principal.
    pub fn new(principal: Option<Principal>, policy: PermissionPolicy) -> Self {
        Self { principal, policy }
    }

    /// Create a context without a principal.
    pub fn anonymous(policy: PermissionPolicy) -> Self {
        Self::new(None, policy)
    }

    /// The acting principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The policy in effect.
    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    /// See [`can_read`].
    pub fn can_read(&self, meta: &EntryMeta) -> bool {
        can_read(meta, self.principal.as_ref(), &self.policy)
    }

    /// See [`can_write`].
    pub fn can_write(&self, meta: &EntryMeta) -> bool {
        can_write(meta, self.principal.as_ref(), &self.policy)
    }

    /// Fail with `PermissionDenied` unless the entry is readable.
    pub fn ensure_read(&self, meta: &EntryMeta) -> AppResult<()> {
        if self.can_read(meta) {
            Ok(())
        } else {
            Err(AppError::permission_denied(format!(
                "Read access to '{}' denied",
                meta.path
            )))
        }
    }

    /// Fail with `PermissionDenied` unless the entry is writable.
    pub fn ensure_write(&self, meta: &EntryMeta) -> AppResult<()> {
        if self.can_write(meta) {
            Ok(())
        } else {
            Err(AppError::permission_denied(format!(
                "Write access to '{}' denied",
                meta.path
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediadesk_core::types::UserId;

    fn meta(protected: bool, author: Option<UserId>, read: &[&str], write: &[&str]) -> EntryMeta {
        let mut meta = EntryMeta::new("doc", "doc".to_string(), None);
        meta.protected = protected;
        meta.author_id = author;
        meta.read_grants = read.iter().map(|r| r.to_string()).collect();
        meta.write_grants = write.iter().map(|r| r.to_string()).collect();
        meta
    }

    #[test]
    fn test_unprotected_always_readable() {
        let policy = PermissionPolicy::default();
        let m = meta(false, Some(UserId::new()), &[], &[]);
        assert!(can_read(&m, None, &policy));
        let guest = Principal::new(UserId::new(), ["guest"]);
        assert!(can_read(&m, Some(&guest), &policy));
    }

    #[test]
    fn test_protected_read_requires_admin_or_grant() {
        let policy = PermissionPolicy::default();
        let m = meta(true, None, &["editor"], &[]);

        assert!(!can_read(&m, None, &policy));
        assert!(!can_read(&m, Some(&Principal::new(UserId::new(), ["guest"])), &policy));
        assert!(can_read(&m, Some(&Principal::new(UserId::new(), ["editor"])), &policy));
        assert!(can_read(&m, Some(&Principal::new(UserId::new(), ["admin"])), &policy));
    }

    #[test]
    fn test_unowned_always_writable() {
        let policy = PermissionPolicy::default();
        let m = meta(true, None, &[], &[]);
        assert!(can_write(&m, None, &policy));
    }

    #[test]
    fn test_owned_write_rules() {
        let policy = PermissionPolicy::default();
        let author = UserId::new();
        let m = meta(true, Some(author), &["editor"], &["publisher"]);

        assert!(!can_write(&m, None, &policy));
        assert!(can_write(&m, Some(&Principal::new(author, Vec::<String>::new())), &policy));
        assert!(can_write(&m, Some(&Principal::new(UserId::new(), ["admin"])), &policy));
        // read grants authorize writes under the default policy
        assert!(can_write(&m, Some(&Principal::new(UserId::new(), ["editor"])), &policy));
        assert!(!can_write(&m, Some(&Principal::new(UserId::new(), ["publisher"])), &policy));
    }

    #[test]
    fn test_write_grant_source_write() {
        let policy = PermissionPolicy {
            write_grant_source: WriteGrantSource::Write,
            ..PermissionPolicy::default()
        };
        let m = meta(true, Some(UserId::new()), &["editor"], &["publisher"]);

        assert!(!can_write(&m, Some(&Principal::new(UserId::new(), ["editor"])), &policy));
        assert!(can_write(&m, Some(&Principal::new(UserId::new(), ["publisher"])), &policy));
    }

    #[test]
    fn test_recomputed_after_change() {
        let ctx = AccessContext::new(
            Some(Principal::new(UserId::new(), ["guest"])),
            PermissionPolicy::default(),
        );
        let mut m = meta(true, None, &[], &[]);
        assert!(!ctx.can_read(&m));

        m.read_grants.insert("guest".to_string());
        assert!(ctx.can_read(&m));

        m.protected = false;
        m.read_grants.clear();
        assert!(ctx.can_read(&m));
        assert!(ctx.ensure_write(&m).is_ok());
    }
}
