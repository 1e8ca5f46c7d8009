// Error types for the fintrack client
// Author: kelexine (https://github.com/kelexine)

use serde_json::Value;
use thiserror::Error;

/// Fallback message when a network failure carries no usable detail.
pub const NETWORK_ERROR_MESSAGE: &str = "Unable to reach the server";

/// The only error type that crosses the client boundary.
///
/// Every variant can be viewed through the uniform `{message, status, details}`
/// shape via [`ApiError::message`], [`ApiError::status`] and [`ApiError::details`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// No response reached us (DNS, refused connection, timeout).
    #[error("Network error: {message}")]
    Network { message: String },

    /// Backend answered with a non-2xx status other than 401.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// Backend answered 401. Local tokens are already gone when this is observed.
    #[error("Session expired: {message}")]
    AuthExpired {
        message: String,
        details: Option<Value>,
    },

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Human readable message, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Network { message }
            | ApiError::Http { message, .. }
            | ApiError::AuthExpired { message, .. } => message.clone(),
            ApiError::NoRefreshToken => "No refresh token available".to_string(),
            ApiError::Decode(msg) | ApiError::Storage(msg) | ApiError::Config(msg) => msg.clone(),
        }
    }

    /// HTTP status, present only when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::AuthExpired { .. } => Some(401),
            _ => None,
        }
    }

    /// Backend supplied `details`, carried verbatim.
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Http { details, .. } | ApiError::AuthExpired { details, .. } => {
                details.as_ref()
            }
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired { .. })
    }

    /// Build an error from a received response body.
    ///
    /// The backend envelope is parsed explicitly: the first non-blank string among
    /// `message`, `detail` and `error` becomes the message, and `details` is carried
    /// as-is. Without a usable message the error fails closed to a generic one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let (message, details) = parse_error_envelope(body);
        let message =
            message.unwrap_or_else(|| format!("Request failed with status code {}", status));

        if status == 401 {
            ApiError::AuthExpired { message, details }
        } else {
            ApiError::Http {
                status,
                message,
                details,
            }
        }
    }

    /// Build an error for a request that never produced a response.
    pub fn network(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else {
            NETWORK_ERROR_MESSAGE.to_string()
        };
        ApiError::Network { message }
    }
}

/// Serializable view of an [`ApiError`], as handed to the UI layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ErrorShape {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&ApiError> for ErrorShape {
    fn from(err: &ApiError) -> Self {
        Self {
            message: err.message(),
            status: err.status(),
            details: err.details().cloned(),
        }
    }
}

/// Extract `(message, details)` from a backend error body.
///
/// The two are independent: `details` is carried whenever present and non-null,
/// even when no usable message is found.
fn parse_error_envelope(body: &str) -> (Option<String>, Option<Value>) {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return (None, None),
    };
    let Some(obj) = parsed.as_object() else {
        return (None, None);
    };

    let message = ["message", "detail", "error"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(|v| v.as_str()))
        .find(|m| !m.trim().is_empty())
        .map(str::to_string);

    let details = obj.get("details").filter(|v| !v.is_null()).cloned();
    (message, details)
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_field_wins() {
        let body = r#"{"message": "Invalid amount", "detail": "ignored", "details": {"amount": ["must be > 0"]}}"#;
        let err = ApiError::from_response(400, body);

        assert_eq!(err.message(), "Invalid amount");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.details(), Some(&json!({"amount": ["must be > 0"]})));
    }

    #[test]
    fn test_drf_detail_envelope() {
        let err = ApiError::from_response(404, r#"{"detail": "Not found."}"#);
        assert_eq!(err.message(), "Not found.");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_unrecognized_body_fails_closed() {
        let err = ApiError::from_response(500, "<html>Internal Server Error</html>");
        assert_eq!(err.message(), "Request failed with status code 500");
        assert_eq!(err.status(), Some(500));

        // Field-level validation errors carry no message key
        let err = ApiError::from_response(400, r#"{"amount": ["required"]}"#);
        assert_eq!(err.message(), "Request failed with status code 400");
    }

    #[test]
    fn test_details_kept_without_message() {
        let err = ApiError::from_response(400, r#"{"details": {"amount": ["required"]}}"#);
        assert_eq!(err.message(), "Request failed with status code 400");
        assert_eq!(err.details(), Some(&json!({"amount": ["required"]})));
    }

    #[test]
    fn test_blank_message_defers_to_detail() {
        let err = ApiError::from_response(403, r#"{"message": "", "detail": "Not allowed"}"#);
        assert_eq!(err.message(), "Not allowed");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_401_maps_to_auth_expired() {
        let err = ApiError::from_response(401, r#"{"detail": "Token is invalid or expired"}"#);
        assert!(err.is_auth_expired());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.message(), "Token is invalid or expired");
    }

    #[test]
    fn test_error_shape_serialization() {
        let err = ApiError::NoRefreshToken;
        let shape = ErrorShape::from(&err);
        let json = serde_json::to_value(&shape).unwrap();

        assert_eq!(json, json!({"message": "No refresh token available"}));
    }
}
