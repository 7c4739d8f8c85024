//! Error types for the admin client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local storage, validation or state error
    #[error(transparent)]
    Core(#[from] coop_core::Error),

    /// Request never got a response
    #[error("Connection error: {message}")]
    Transport { message: String },

    /// Backend answered with a non-success status
    #[error("Request failed with HTTP {status}")]
    Status { status: u16, detail: Option<String> },

    /// Response body didn't have the expected shape
    #[error("Unexpected response: {message}")]
    Decode { message: String },

    /// Login endpoint rejected the credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token was issued but the profile couldn't be fetched
    #[error("Could not load user profile: {message}")]
    Profile { message: String },

    /// No session in storage
    #[error("Not logged in")]
    NotAuthenticated,

    /// Backend rejected the stored token
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// A login exchange is already running
    #[error("Login already in progress")]
    LoginInProgress,

    /// Action failed; `message` is what the user was told
    #[error("{message}")]
    Rejected { message: String },
}

impl ClientError {
    /// Create a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Error detail reported by the backend, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => Some(detail),
            _ => None,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => "Connection error".to_string(),
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Profile { .. } => "Could not load user profile".to_string(),
            Self::Core(coop_core::Error::InvalidInput(message)) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

/// Pull the `detail` field out of a backend error body
///
/// Validation errors carry a list of `{loc, msg}` entries instead of a
/// string; their messages are joined.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
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
