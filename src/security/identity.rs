//! Session identity resolution.
//!
//! # Responsibilities
//! - Decide whether the requester is signed in (`auth_token` cookie)
//! - Read their role from the `user_data` cookie (URL-encoded JSON)
//!
//! # Design Decisions
//! - Never fails: a bad `user_data` cookie only loses the role
//! - Authentication and role are independent; a signed-in visitor with
//!   an unreadable role is treated as the lowest tier
//! - Resolved per request, never cached
//!
//! The token itself is opaque here. Verifying it is the backend's job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Presence of this cookie means the visitor is authenticated.
pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// URL-encoded JSON profile carrying the `role` field.
pub const USER_DATA_COOKIE: &str = "user_data";

/// Role hierarchy, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Anonymous,
    Member,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Canonical landing page for this role, without locale prefix.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::SuperAdmin => "/super-admin/dashboard",
            Role::Admin => "/admin/dashboard",
            Role::Member | Role::Anonymous => "/dashboard",
        }
    }
}

/// Who is making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Identity {
    pub is_authenticated: bool,
    /// `None` when the role cookie is missing or unreadable.
    pub role: Option<Role>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(role: Option<Role>) -> Self {
        Self {
            is_authenticated: true,
            role,
        }
    }

    /// The role access rules should act on. Unauthenticated visitors and
    /// unresolved roles both collapse to [`Role::Anonymous`].
    pub fn effective_role(&self) -> Role {
        if self.is_authenticated {
            self.role.unwrap_or(Role::Anonymous)
        } else {
            Role::Anonymous
        }
    }
}

#[derive(Debug, Error)]
enum UserDataError {
    #[error("cookie is not valid percent-encoded UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("cookie is not a JSON object with a known role: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct UserData {
    role: Role,
}

/// Derive the requester's identity from their cookies.
pub fn resolve_identity(cookies: &HashMap<String, String>) -> Identity {
    let is_authenticated = cookies
        .get(AUTH_TOKEN_COOKIE)
        .is_some_and(|token| !token.is_empty());

    let role = cookies
        .get(USER_DATA_COOKIE)
        .and_then(|raw| match decode_role(raw) {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable user_data cookie");
                None
            }
        });

    Identity {
        is_authenticated,
        role,
    }
}

fn decode_role(raw: &str) -> Result<Role, UserDataError> {
    let json = urlencoding::decode(raw)?;
    let data: UserData = serde_json::from_str(&json)?;
    Ok(data.role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn user_data(json: &str) -> String {
        urlencoding::encode(json).into_owned()
    }

    #[test]
    fn test_no_cookies_is_anonymous() {
        assert_eq!(resolve_identity(&HashMap::new()), Identity::anonymous());
    }

    #[test]
    fn test_token_and_role() {
        let data = user_data(r#"{"id":7,"email":"a@b.c","role":"super_admin"}"#);
        let identity = resolve_identity(&cookies(&[("auth_token", "jwt"), ("user_data", &data)]));
        assert_eq!(identity, Identity::authenticated(Some(Role::SuperAdmin)));
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let identity = resolve_identity(&cookies(&[("auth_token", "")]));
        assert!(!identity.is_authenticated);
    }

    #[test]
    fn test_malformed_user_data_keeps_authentication() {
        for bad in ["%7Bnot-json", "%E0%A4%A", r#"{"name":"x"}"#, r#"{"role":"owner"}"#] {
            let identity = resolve_identity(&cookies(&[("auth_token", "jwt"), ("user_data", bad)]));
            assert_eq!(identity, Identity::authenticated(None), "cookie {bad}");
        }
    }

    #[test]
    fn test_role_without_token_is_not_authenticated() {
        let data = user_data(r#"{"role":"admin"}"#);
        let identity = resolve_identity(&cookies(&[("user_data", &data)]));
        assert!(!identity.is_authenticated);
        assert_eq!(identity.role, Some(Role::Admin));
        assert_eq!(identity.effective_role(), Role::Anonymous);
    }

    #[test]
    fn test_unknown_role_is_lowest_tier() {
        assert_eq!(Identity::authenticated(None).effective_role(), Role::Anonymous);
        assert!(Role::Anonymous < Role::Member);
        assert!(Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn test_role_homes() {
        assert_eq!(Role::Member.home_path(), "/dashboard");
        assert_eq!(Role::Admin.home_path(), "/admin/dashboard");
        assert_eq!(Role::SuperAdmin.home_path(), "/super-admin/dashboard");
        assert_eq!(Role::Anonymous.home_path(), "/dashboard");
    }
}
