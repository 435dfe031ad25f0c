//! Client configuration

use crate::error::{ClientError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the dashboard API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is resolved against, e.g. `http://host:8000/api`
    pub api_base_url: String,

    /// Per-request timeout in seconds
    /// Default: 30 seconds
    pub request_timeout_secs: u64,

    /// Where a file-backed session is kept. `None` keeps the session in memory.
    pub session_file: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Build a configuration from `ENGDASH_*` environment variables
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("ENGDASH_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let request_timeout_secs = match std::env::var("ENGDASH_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                ClientError::Configuration(format!("ENGDASH_REQUEST_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let session_file = std::env::var_os("ENGDASH_SESSION_FILE").map(PathBuf::from);

        let config = Self {
            api_base_url,
            request_timeout_secs,
            session_file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.api_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "api_base_url must be an http(s) URL: {base}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ClientError::Configuration(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Join an endpoint path onto the base URL with exactly one slash between them
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_file: None,
        }
    }
}
