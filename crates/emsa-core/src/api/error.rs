use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - session expired or invalid credentials")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error bodies from the backend use the same envelope as successes.
#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// The envelope's `message` when the body has one, else the raw body.
    fn describe_body(body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { message: Some(msg) }) if !msg.trim().is_empty() => {
                Self::truncate_body(&msg)
            }
            _ => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::describe_body(body);
        match status.as_u16() {
            400 | 409 | 422 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// True when the server rejected the session's credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Text the server supplied for this failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::BadRequest(m)
            | ApiError::ServerError(m)
                if !m.is_empty() =>
            {
                Some(m.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(ref m) if m == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "x"),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_envelope_message_is_extracted() {
        let body = r#"{"success": false, "message": "Username already exists", "data": null}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.server_message(), Some("Username already exists"));
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "é".repeat(400);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let ApiError::ServerError(msg) = err else {
            panic!("expected server error");
        };
        assert!(msg.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_only_unauthorized_is_auth_failure() {
        assert!(ApiError::Unauthorized.is_auth_failure());
        assert!(!ApiError::AccessDenied(String::new()).is_auth_failure());
        assert!(!ApiError::RateLimited.is_auth_failure());
    }
}
