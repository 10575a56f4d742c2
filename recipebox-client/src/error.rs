use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used across the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Coarse failure classes used when deciding how to degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// The server rejected the credential.
    Authentication,
    /// The server answered with a non-success status other than 401/403.
    Status,
    /// The response body did not have the expected shape.
    Malformed,
}

/// Errors surfaced by the API client and the session store.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No HTTP response was received.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 or 403, with the server's message.
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: StatusCode, message: String },

    /// Any other non-success status.
    #[error("server responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A success body that could not be decoded.
    #[error("unexpected response from {endpoint}: {message}")]
    Malformed {
        endpoint: &'static str,
        message: String,
    },
}

impl ClientError {
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            Self::Unauthorized { status, message }
        } else {
            Self::Status { status, message }
        }
    }

    pub(crate) fn malformed(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            endpoint,
            message: message.into(),
        }
    }

    /// Failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Unauthorized { .. } => ErrorKind::Authentication,
            Self::Status { .. } => ErrorKind::Status,
            Self::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// HTTP status of the failed response, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Malformed { .. } => None,
        }
    }

    /// Whether the server rejected the session credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
