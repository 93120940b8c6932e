//! Login response normalization.
//!
//! The backend has answered `/auth/login` in more than one shape over time:
//! a flat object (`token`, `accountId`, `username`, `role`, ...), or one with
//! the profile nested under `user`, sometimes wrapped in the standard
//! `{ success, message, data }` envelope and sometimes carrying `accessToken`
//! instead of `token`. Everything is folded into `AuthPayload` here so the
//! rest of the client only ever sees one shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::Role;

#[derive(Error, Debug)]
pub enum AuthPayloadError {
    #[error("login response did not contain a token")]
    MissingToken,

    #[error("malformed login response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The client-visible profile of the signed-in account.
///
/// `role` is kept as the raw string the server sent so that an unrecognized
/// value survives a restart unchanged; `role()` is the only way to interpret it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "accountId")]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: String,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Full name if present, otherwise the username.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }

    /// First word of the display name, for greetings.
    pub fn first_name(&self) -> &str {
        self.display_name()
            .split_whitespace()
            .next()
            .unwrap_or(&self.username)
    }
}

/// An authenticated principal: bearer token plus profile.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

// Token is omitted so sessions can be logged safely.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Canonical login payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawAuthPayload")]
pub struct AuthPayload {
    session: Session,
}

impl AuthPayload {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            session: Session {
                token: token.into(),
                user,
            },
        }
    }

    /// Normalize a raw `/auth/login` response body, unwrapping the API
    /// envelope when present.
    pub fn from_response_value(value: Value) -> Result<Self, AuthPayloadError> {
        let inner = match value {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        let raw: RawAuthPayload = serde_json::from_value(inner)?;
        Self::try_from(raw)
    }

    pub fn token(&self) -> &str {
        &self.session.token
    }

    pub fn user(&self) -> &UserProfile {
        &self.session.user
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}

/// Every field the login response has been seen to carry, all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAuthPayload {
    token: Option<String>,
    access_token: Option<String>,
    user: Option<UserProfile>,
    account_id: Option<i64>,
    id: Option<i64>,
    username: Option<String>,
    email: Option<String>,
    full_name: Option<String>,
    role: Option<String>,
}

impl TryFrom<RawAuthPayload> for AuthPayload {
    type Error = AuthPayloadError;

    fn try_from(raw: RawAuthPayload) -> Result<Self, Self::Error> {
        let token = raw
            .token
            .filter(|t| !t.is_empty())
            .or(raw.access_token.filter(|t| !t.is_empty()))
            .ok_or(AuthPayloadError::MissingToken)?;

        let user = match raw.user {
            Some(user) => user,
            None => UserProfile {
                id: raw.account_id.or(raw.id),
                username: raw.username.unwrap_or_default(),
                email: raw.email,
                full_name: raw.full_name,
                role: raw.role.unwrap_or_default(),
            },
        };

        Ok(AuthPayload::new(token, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected_user() -> UserProfile {
        UserProfile {
            id: Some(3),
            username: "mgr".to_string(),
            email: Some("mgr@example.com".to_string()),
            full_name: Some("Maria Garcia".to_string()),
            role: "MANAGER".to_string(),
        }
    }

    #[test]
    fn test_flat_payload() {
        let body = json!({
            "token": "abc",
            "tokenType": "Bearer",
            "accountId": 3,
            "username": "mgr",
            "email": "mgr@example.com",
            "fullName": "Maria Garcia",
            "role": "MANAGER"
        });
        let payload = AuthPayload::from_response_value(body).expect("flat payload");
        assert_eq!(payload.token(), "abc");
        assert_eq!(payload.user(), &expected_user());
    }

    #[test]
    fn test_nested_payload_matches_flat() {
        let flat = json!({
            "token": "abc", "accountId": 3, "username": "mgr",
            "email": "mgr@example.com", "fullName": "Maria Garcia", "role": "MANAGER"
        });
        let nested = json!({
            "token": "abc",
            "user": {"id": 3, "username": "mgr", "email": "mgr@example.com",
                     "fullName": "Maria Garcia", "role": "MANAGER"}
        });
        assert_eq!(
            AuthPayload::from_response_value(flat).unwrap(),
            AuthPayload::from_response_value(nested).unwrap()
        );
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let body = json!({
            "success": true,
            "message": "Login successful",
            "data": {"token": "abc", "accountId": 3, "username": "mgr",
                     "email": "mgr@example.com", "fullName": "Maria Garcia", "role": "MANAGER"},
            "timestamp": "2024-03-20T10:30:00"
        });
        let payload = AuthPayload::from_response_value(body).unwrap();
        assert_eq!(payload.user(), &expected_user());
    }

    #[test]
    fn test_access_token_alias() {
        let body = json!({"accessToken": "xyz", "username": "u", "role": "USER"});
        let payload = AuthPayload::from_response_value(body).unwrap();
        assert_eq!(payload.token(), "xyz");
        assert_eq!(payload.user().role(), Some(Role::User));
    }

    #[test]
    fn test_missing_token_rejected() {
        let body = json!({"username": "u", "role": "USER"});
        assert!(matches!(
            AuthPayload::from_response_value(body),
            Err(AuthPayloadError::MissingToken)
        ));

        let empty = json!({"token": "", "username": "u", "role": "USER"});
        assert!(matches!(
            AuthPayload::from_response_value(empty),
            Err(AuthPayloadError::MissingToken)
        ));
    }

    #[test]
    fn test_unknown_role_is_kept_but_uninterpreted() {
        let body = json!({"token": "t", "username": "u", "role": "SUPERVISOR"});
        let payload = AuthPayload::from_response_value(body).unwrap();
        assert_eq!(payload.user().role, "SUPERVISOR");
        assert_eq!(payload.user().role(), None);
    }

    #[test]
    fn test_deserialize_directly() {
        let payload: AuthPayload =
            serde_json::from_str(r#"{"token": "t", "role": "ADMIN"}"#).unwrap();
        assert_eq!(payload.user().role(), Some(Role::Admin));
        assert!(serde_json::from_str::<AuthPayload>(r#"{"role": "ADMIN"}"#).is_err());
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = AuthPayload::new("secret-token", expected_user()).into_session();
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_display_and_first_name() {
        let user = expected_user();
        assert_eq!(user.display_name(), "Maria Garcia");
        assert_eq!(user.first_name(), "Maria");

        let bare = UserProfile {
            username: "jdoe".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.display_name(), "jdoe");
        assert_eq!(bare.first_name(), "jdoe");
    }
}
