//! Error types for the dashboard client

use thiserror::Error;

/// Client error types, as perceived by the caller
#[derive(Error, Debug)]
pub enum ClientError {
    /// No access token in the session. No network call was made.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The refresh exchange failed or was exhausted; the session has been cleared.
    #[error("Session expired")]
    SessionExpired,

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure, e.g. server unreachable or timed out
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether the caller must send the user back to the login entry point
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthenticated | ClientError::SessionExpired)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::NetworkError(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::MalformedResponse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
