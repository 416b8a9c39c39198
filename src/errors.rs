use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Error taxonomy for every client operation.
///
/// Nothing here is fatal to the caller: each variant renders as a displayable
/// message and the CLI/embedding application is expected to stay interactive
/// and offer a retry.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response with a best-effort message extracted from the body.
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// 401 that one refresh cycle could not resolve. The session store has
    /// been cleared; the caller must route back to login.
    #[error("authentication expired, please log in again")]
    AuthExpired,

    /// Local form validation failed before any network call was issued.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request status PATCH succeeded but the follow-up inventory
    /// deduction did not. The request stays approved server-side.
    #[error("request {request_id} approved but inventory deduction failed: {detail}")]
    PartialApproval { request_id: u64, detail: String },

    /// Response body was not the JSON shape we expected.
    #[error("parse error: {0}")]
    Parse(String),

    /// Session store I/O failure.
    #[error("session error: {0}")]
    Session(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl ClientError {
    pub fn api(status: StatusCode, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Backends in this system answer with `{"detail": ...}`, `{"message": ...}`
/// or `{"error": ...}` depending on the view; anything else (HTML error
/// pages, empty bodies) falls back to the raw text or the status line.
pub fn extract_api_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
        // Field-level validation maps, e.g. {"item_id": ["Invalid item"]}
        if let Some(map) = value.as_object() {
            if let Some((field, Value::Array(msgs))) = map.iter().next() {
                let joined = msgs
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if !joined.is_empty() {
                    return format!("{}: {}", field, joined);
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
