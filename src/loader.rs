//! Page data loading
//!
//! Loaders turn a protected GET into view state and never return an error:
//! failures become an empty value plus a [`LoadIssue`]. Nothing is cached, every
//! call refetches.

use crate::auth_client::ApiRequester;
use crate::error::ClientError;
use crate::types::ApiMethod;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Why a view is showing degraded data
#[derive(Debug, Clone, PartialEq)]
pub enum LoadIssue {
    /// Session missing or expired; the UI must go to the login entry point
    LoginRequired,
    /// The API answered with an error status
    Failed { status: u16, message: String },
    /// The body was not the expected shape
    Malformed(String),
    /// The API could not be reached; retrying may help
    Unreachable(String),
    /// The call could not be issued at all
    Other(String),
}

impl From<ClientError> for LoadIssue {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Unauthenticated | ClientError::SessionExpired => LoadIssue::LoginRequired,
            ClientError::RequestFailed { status, body } => LoadIssue::Failed { status, message: body },
            ClientError::MalformedResponse(msg) => LoadIssue::Malformed(msg),
            ClientError::NetworkError(msg) => LoadIssue::Unreachable(msg),
            other => LoadIssue::Other(other.to_string()),
        }
    }
}

/// Data for one view plus what, if anything, went wrong loading it
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub data: T,
    pub issue: Option<LoadIssue>,
}

impl<T> ViewState<T> {
    pub fn ready(data: T) -> Self {
        Self { data, issue: None }
    }

    pub fn is_ready(&self) -> bool {
        self.issue.is_none()
    }

    pub fn requires_login(&self) -> bool {
        matches!(self.issue, Some(LoadIssue::LoginRequired))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        ViewState {
            data: f(self.data),
            issue: self.issue,
        }
    }
}

impl<T: Default> ViewState<T> {
    pub fn degraded(issue: LoadIssue) -> Self {
        Self {
            data: T::default(),
            issue: Some(issue),
        }
    }
}

fn degrade<T: Default>(path: &str, error: ClientError) -> ViewState<T> {
    let issue = LoadIssue::from(error);
    match &issue {
        LoadIssue::Malformed(msg) => warn!(path = %path, error = %msg, "Discarding malformed response"),
        LoadIssue::LoginRequired => debug!(path = %path, "Load needs a login"),
        other => warn!(path = %path, issue = ?other, "Load failed"),
    }
    ViewState::degraded(issue)
}

/// Load a JSON array into `Vec<T>`; anything else yields an empty list
pub async fn load_list<T, R>(api: &R, path: &str) -> ViewState<Vec<T>>
where
    T: DeserializeOwned,
    R: ApiRequester,
{
    let value = match api.request(ApiMethod::Get, path, None).await {
        Ok(value) => value,
        Err(e) => return degrade(path, e),
    };

    if !value.is_array() {
        return degrade(
            path,
            ClientError::MalformedResponse(format!("expected an array, got {}", kind_of(&value))),
        );
    }

    match serde_json::from_value::<Vec<T>>(value) {
        Ok(items) => {
            debug!(path = %path, count = %items.len(), "Loaded list");
            ViewState::ready(items)
        }
        Err(e) => degrade(path, ClientError::MalformedResponse(e.to_string())),
    }
}

/// Load a JSON object into `T`; anything else yields `T::default()`
pub async fn load_one<T, R>(api: &R, path: &str) -> ViewState<T>
where
    T: DeserializeOwned + Default,
    R: ApiRequester,
{
    let value = match api.request(ApiMethod::Get, path, None).await {
        Ok(value) => value,
        Err(e) => return degrade(path, e),
    };

    if !value.is_object() {
        return degrade(
            path,
            ClientError::MalformedResponse(format!("expected an object, got {}", kind_of(&value))),
        );
    }

    match serde_json::from_value::<T>(value) {
        Ok(item) => ViewState::ready(item),
        Err(e) => degrade(path, ClientError::MalformedResponse(e.to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
