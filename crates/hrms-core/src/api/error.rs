use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message shown when the backend cannot be reached at all
pub const CONNECTION_MESSAGE: &str = "Cannot connect to server. Please check if backend is running.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("Server error {status}: {}", truncate_body(.body))]
    Server { status: StatusCode, body: String },

    /// The request went out but no response came back (refused, reset, timed out).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request could not be built or sent.
    #[error("Request setup failed: {0}")]
    RequestSetup(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let cut = (0..=MAX_ERROR_BODY_LENGTH)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }
}

impl ApiError {
    /// Classify a transport failure from reqwest.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::RequestSetup(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Human-readable `detail` from a server error body.
    ///
    /// FastAPI sends either `{"detail": "..."}` or, for validation failures,
    /// `{"detail": [{"msg": "..."}, ...]}`.
    pub fn detail(&self) -> Option<String> {
        let ApiError::Server { body, .. } = self else {
            return None;
        };
        let value: Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }

    /// Message suitable for showing to a user, falling back to `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server { .. } => self.detail().unwrap_or_else(|| fallback.to_string()),
            ApiError::Network(_) => CONNECTION_MESSAGE.to_string(),
            _ => fallback.to_string(),
        }
    }
}
