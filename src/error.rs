//! godpanel error types
//!
//! Two layers:
//!
//! - [`ApiError`] is the normalized failure of one HTTP call. It is built
//!   exactly once, at the client boundary, carries one [`ErrorKind`] from
//!   the taxonomy and is never re-classified by callers.
//! - [`PanelError`] is the crate error returned by every public operation.
//!   It wraps `ApiError` transparently next to local failures (config,
//!   storage, decoding).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::{HttpResponse, TransportError};

/// Error taxonomy for failed API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    #[serde(rename = "TIMEOUT_ERROR")]
    Timeout,
    #[serde(rename = "UNAUTHORIZED_ERROR")]
    Unauthorized,
    #[serde(rename = "FORBIDDEN_ERROR")]
    Forbidden,
    #[serde(rename = "NOT_FOUND_ERROR")]
    NotFound,
    #[serde(rename = "SERVER_ERROR")]
    Server,
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

impl ErrorKind {
    /// Classify a response status. Only called when a response was received.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            500 | 502 | 503 => ErrorKind::Server,
            400 | 422 => ErrorKind::Validation,
            _ => ErrorKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED_ERROR",
            ErrorKind::Forbidden => "FORBIDDEN_ERROR",
            ErrorKind::NotFound => "NOT_FOUND_ERROR",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Message shown when neither the server nor the transport explained the failure.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Request timeout. Please try again.",
            ErrorKind::Unauthorized => "Session expired. Please login again.",
            ErrorKind::Forbidden => "Access denied.",
            ErrorKind::NotFound => "Resource not found.",
            ErrorKind::Server => "Server error. Please try again later.",
            ErrorKind::Network | ErrorKind::Validation | ErrorKind::Unknown => {
                "Network error. Please check your connection."
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized failure of one API call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    status: Option<u16>,
    message: String,
    payload: Option<Value>,
}

impl ApiError {
    /// Failure where no response was received.
    pub fn from_transport(err: &TransportError) -> Self {
        let kind = if err.timed_out {
            ErrorKind::Timeout
        } else {
            ErrorKind::Network
        };
        Self {
            kind,
            status: None,
            message: resolve_message(kind, None, &err.message),
            payload: None,
        }
    }

    /// Failure where the backend answered with a non-2xx status.
    pub fn from_response(response: HttpResponse) -> Self {
        let kind = ErrorKind::from_status(response.status);
        let transport_message = format!("Request failed with status code {}", response.status);
        let payload = (!response.body.is_null()).then_some(response.body);
        Self {
            kind,
            status: Some(response.status),
            message: resolve_message(kind, payload.as_ref(), &transport_message),
            payload,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status, `None` for network failures and timeouts.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Body the backend returned with the failure, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// Server-provided `message`, else the transport message, else the per-kind fallback.
fn resolve_message(kind: ErrorKind, payload: Option<&Value>, transport_message: &str) -> String {
    if let Some(message) = payload
        .and_then(|p| p.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    {
        return message.to_string();
    }
    if !transport_message.is_empty() {
        return transport_message.to_string();
    }
    kind.fallback_message().to_string()
}

/// godpanel error types
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    // Normalized API failure
    #[error(transparent)]
    Api(#[from] ApiError),

    // Auth state errors
    #[error("no refresh token available")]
    MissingRefreshToken,

    // Data errors
    #[error("empty response: envelope carried no data")]
    EmptyResponse,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Local key-value storage errors
    #[error("storage error: {0}")]
    Storage(String),
}

impl PanelError {
    /// The normalized API error, when this is one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            PanelError::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.api().map(ApiError::kind)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == Some(ErrorKind::Unauthorized)
    }
}

/// Result type alias for godpanel operations
pub type Result<T> = std::result::Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> HttpResponse {
        HttpResponse { status, body }
    }

    #[test]
    fn status_classification() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        for s in [500, 502, 503] {
            assert_eq!(ErrorKind::from_status(s), ErrorKind::Server);
        }
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(422), ErrorKind::Validation);
        for s in [408, 409, 429, 504, 418] {
            assert_eq!(ErrorKind::from_status(s), ErrorKind::Unknown);
        }
    }

    #[test]
    fn transport_failures() {
        let timeout = ApiError::from_transport(&TransportError::timeout("deadline exceeded"));
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.status(), None);
        assert_eq!(timeout.message(), "deadline exceeded");

        let network = ApiError::from_transport(&TransportError::network(""));
        assert_eq!(network.kind(), ErrorKind::Network);
        assert_eq!(network.message(), ErrorKind::Network.fallback_message());
    }

    #[test]
    fn server_message_wins() {
        let err = ApiError::from_response(response(422, json!({"message": "email taken"})));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), "email taken");
        assert_eq!(err.payload(), Some(&json!({"message": "email taken"})));
    }

    #[test]
    fn status_message_without_server_message() {
        let err = ApiError::from_response(response(503, Value::Null));
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "Request failed with status code 503");
        assert!(err.payload().is_none());
    }

    #[test]
    fn display_includes_kind() {
        let err = ApiError::from_response(response(404, json!({"message": "no such user"})));
        assert_eq!(err.to_string(), "NOT_FOUND_ERROR: no such user");
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(
            serde_json::to_value(ErrorKind::NotFound).unwrap(),
            json!("NOT_FOUND_ERROR")
        );
    }
}
