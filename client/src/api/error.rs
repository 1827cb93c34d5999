//! Normalized request failures.

use serde_json::Value;

/// Status reported for failures that never produced an HTTP response.
pub const STATUS_NETWORK: u16 = 0;
/// Status reported for requests that exceeded the timeout.
pub const STATUS_TIMEOUT: u16 = 408;
/// Status reported for anything that could not be classified.
pub const STATUS_UNEXPECTED: u16 = 500;

/// Every way a request can fail, normalized to one type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response: connection refused, DNS, reset.
    #[error("Network error - please check your connection")]
    Transport { detail: String },

    /// The request ran past the configured timeout and was aborted.
    #[error("Request timeout")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<Value>,
    },

    /// Anything else, e.g. a 2xx body that is not the expected JSON.
    #[error("An unexpected error occurred")]
    Unexpected { detail: String },
}

impl ApiError {
    /// Build a status error from a response body.
    ///
    /// The message comes from the body's `message` field when the body is a
    /// JSON object carrying one, otherwise `HTTP <status>: <reason>`.
    pub fn from_response(status: u16, reason: &str, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let object = parsed.as_ref().and_then(Value::as_object);

        let message = object
            .and_then(|o| o.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}: {reason}"));

        let code = object.and_then(|o| o.get("code")).and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        ApiError::Status {
            status,
            message,
            code,
            details: parsed,
        }
    }

    /// Human-readable message, the only part the store keeps.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, with 0 for network failures and 408 for timeouts.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Transport { .. } => STATUS_NETWORK,
            ApiError::Timeout => STATUS_TIMEOUT,
            ApiError::Status { status, .. } => *status,
            ApiError::Unexpected { .. } => STATUS_UNEXPECTED,
        }
    }

    /// Server-supplied error code.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Parsed error body.
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Status { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Unexpected {
                detail: e.to_string(),
            }
        } else if e.is_connect() || e.is_request() || e.is_body() {
            ApiError::Transport {
                detail: e.to_string(),
            }
        } else {
            ApiError::Unexpected {
                detail: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Unexpected {
            detail: e.to_string(),
        }
    }
}

/// Result type alias for requests.
pub type Result<T> = std::result::Result<T, ApiError>;
