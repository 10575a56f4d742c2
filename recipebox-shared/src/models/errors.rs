use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body the API sends alongside a non-2xx status.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable reason given by the server.
    pub message: String,
    /// Some routes echo `success: false` next to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl ErrorResponse {
    /// Creates a new error response with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: None,
        }
    }

    /// Pull an error message out of an arbitrary response body.
    ///
    /// Accepts the structured `{ "message": ... }` shape as well as a bare
    /// JSON string. Returns `None` when neither carries any text.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        match body {
            Value::String(text) if !text.trim().is_empty() => Some(Self::new(text.trim())),
            Value::Object(_) => serde_json::from_value::<Self>(body.clone())
                .ok()
                .filter(|error| !error.message.trim().is_empty()),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ErrorResponse {}
