//! `Caller` extractor: builds the request context from identity headers.
//!
//! Authentication happens upstream; a fronting gateway forwards the
//! authenticated user in `X-User-Id` and its roles in `X-User-Roles`
//! (comma-separated). Requests without `X-User-Id` are anonymous.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use mediadesk_core::AppError;
use mediadesk_core::types::UserId;
use mediadesk_entity::{PermissionPolicy, Principal};
use mediadesk_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the user's roles.
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// The acting user of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = context_from_headers(&parts.headers, state.policy.clone())?;
        Ok(Caller(ctx))
    }
}

/// Builds a request context from identity headers.
pub fn context_from_headers(
    headers: &HeaderMap,
    policy: PermissionPolicy,
) -> Result<RequestContext, AppError> {
    let Some(raw_id) = header_str(headers, USER_ID_HEADER)? else {
        return Ok(RequestContext::anonymous(policy));
    };
    let user_id: UserId = raw_id
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid {USER_ID_HEADER} header")))?;

    let roles = header_str(headers, USER_ROLES_HEADER)?
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();

    Ok(RequestContext::new(Some(Principal::new(user_id, roles)), policy))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, AppError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::validation(format!("Header {name} is not valid text")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_missing_id_is_anonymous() {
        let ctx = context_from_headers(&HeaderMap::new(), PermissionPolicy::default()).unwrap();
        assert!(ctx.principal.is_none());
    }

    #[test]
    fn test_roles_are_split_and_trimmed() {
        let id = UserId::new();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        headers.insert(USER_ROLES_HEADER, HeaderValue::from_static("admin, editors,,"));

        let ctx = context_from_headers(&headers, PermissionPolicy::default()).unwrap();
        let principal = ctx.principal.unwrap();
        assert_eq!(principal.user_id, id);
        assert_eq!(principal.roles.len(), 2);
        assert!(principal.has_role("editors"));
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        let err = context_from_headers(&headers, PermissionPolicy::default()).unwrap_err();
        assert_eq!(err.kind, mediadesk_core::ErrorKind::Validation);
    }
}
