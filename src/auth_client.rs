//! Authenticated API client with transparent token refresh

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::navigation;
use crate::session_store::SessionStore;
use crate::types::*;
use async_singleflight::Group;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const TOKEN_PATH: &str = "token/";
pub const TOKEN_REFRESH_PATH: &str = "token/refresh/";
pub const ME_PATH: &str = "me/";

/// Macro to check HTTP response status and return `RequestFailed` if not successful
macro_rules! check_response {
    ($response:expr) => {
        if !$response.status().is_success() {
            let status = $response.status().as_u16();
            let body = $response.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed { status, body });
        }
    };
}

/// Anything that can perform a protected API call
///
/// Page loaders and resource accessors depend on this rather than on
/// [`ApiClient`] directly.
pub trait ApiRequester: Send + Sync {
    /// Perform a protected call and return the parsed JSON body
    fn request(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Why a refresh exchange failed. Shared between coalesced waiters, so it must be `Clone`.
#[derive(Debug, Clone)]
enum RefreshFailure {
    /// The server refused the refresh token or answered with garbage
    Rejected(String),
    /// The server could not be reached
    Transport(String),
}

/// Dashboard API client
///
/// Attaches the session's bearer token to every protected call. A 401 triggers
/// one refresh exchange and one retry; a second 401 ends the session.
pub struct ApiClient {
    config: ClientConfig,
    session: SessionStore,
    http_client: Client,
    /// Singleflight group so concurrent 401s share one refresh exchange per refresh token
    refresh_singleflight: Group<String, RefreshFailure>,
}

impl ApiClient {
    /// Create a client whose session lives where `config.session_file` says
    pub fn new(config: ClientConfig) -> Result<Arc<Self>> {
        let session = match &config.session_file {
            Some(path) => SessionStore::open_file(path)?,
            None => SessionStore::in_memory(),
        };
        Self::with_session(config, session)
    }

    /// Create a client over an existing session store
    pub fn with_session(config: ClientConfig, session: SessionStore) -> Result<Arc<Self>> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Arc::new(Self {
            config,
            session,
            http_client,
            refresh_singleflight: Group::new(),
        }))
    }

    /// Get the configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the session store (for advanced usage)
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Get the cached profile of the signed-in user
    ///
    /// This reads the session only; use [`ApiClient::reload_profile`] to ask the server.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.user()
    }

    /// Exchange credentials for a token pair, cache the profile, and pick the landing route
    ///
    /// The session is left empty if the profile cannot be fetched or carries no role.
    ///
    /// # Arguments
    /// * `username` - Account name
    /// * `password` - Account password, sent only to the token endpoint
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let url = self.config.endpoint_url(TOKEN_PATH);
        let response = self
            .http_client
            .post(&url)
            .json(&TokenObtainRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("Login failed with status {status}"));
            warn!(username = %username, status = %status, "Login rejected");
            return Err(ClientError::LoginRejected(detail));
        }

        let tokens: TokenObtainResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(format!("token response: {e}")))?;

        self.session.store_tokens(&TokenPair {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
        })?;

        let user = match self.fetch_profile().await {
            Ok(user) => user,
            Err(e) => {
                warn!(username = %username, error = %e, "Failed to load user profile after login");
                self.expire_session();
                return Err(e);
            }
        };

        let Some(role) = user.role.clone() else {
            warn!(username = %username, "Logged in user has no role");
            self.expire_session();
            return Err(ClientError::MalformedResponse("user profile has no role".to_string()));
        };

        self.session.store_user(&user)?;
        let landing_route = navigation::landing_route(&role);
        info!(username = %username, role = %role, landing_route = %landing_route, "Logged in");

        Ok(LoginOutcome { user, landing_route })
    }

    /// Re-fetch `/me/` and update the cached profile
    pub async fn reload_profile(&self) -> Result<UserProfile> {
        let user = self.fetch_profile().await?;
        self.session.store_user(&user)?;
        Ok(user)
    }

    async fn fetch_profile(&self) -> Result<UserProfile> {
        let me: MeResponse = self.request_json(ApiMethod::Get, ME_PATH, None).await?;
        Ok(UserProfile::from(me))
    }

    /// Drop the session
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Perform a protected call, refreshing the access token once on 401
    ///
    /// # Arguments
    /// * `method` - HTTP method; POST and PATCH need a body
    /// * `path` - Path relative to the API base URL, e.g. `"work-order-list/"`
    /// * `body` - Optional JSON body
    pub async fn request(&self, method: ApiMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        let access_token = self.session.access_token().ok_or(ClientError::Unauthenticated)?;

        if method.requires_body() && body.is_none() {
            return Err(ClientError::InvalidRequest(format!("{method} {path} requires a JSON body")));
        }

        let url = self.config.endpoint_url(path);
        let mut response = self.send(method, &url, &access_token, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!(method = %method, path = %path, "Access token rejected, refreshing");
            let fresh_token = self.refresh_after_unauthorized(&access_token).await?;

            response = self.send(method, &url, &fresh_token, body).await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                warn!(method = %method, path = %path, "Request still unauthorized after refresh");
                self.expire_session();
                return Err(ClientError::SessionExpired);
            }
        }

        check_response!(response);
        read_json(response).await
    }

    /// As [`ApiClient::request`], then deserialize into `T`
    ///
    /// A body that does not have the shape of `T` is `MalformedResponse`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let value = self.request(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| ClientError::MalformedResponse(format!("{path}: {e}")))
    }

    async fn send(&self, method: ApiMethod, url: &str, access_token: &str, body: Option<&Value>) -> Result<Response> {
        let mut builder = self
            .http_client
            .request(method.into(), url)
            .bearer_auth(access_token);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(method = %method, url = %url, "Sending request");
        Ok(builder.send().await?)
    }

    /// Get a usable access token after `stale_token` was rejected
    ///
    /// If another request already replaced the stale token, its result is reused
    /// instead of spending the refresh token again.
    async fn refresh_after_unauthorized(&self, stale_token: &str) -> Result<String> {
        if let Some(current) = self.session.access_token() {
            if current != stale_token {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        self.refresh_access_token().await
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Concurrent callers share one in-flight exchange. A rejected exchange
    /// clears the session; an unreachable server leaves it intact.
    ///
    /// # Returns
    /// * `Ok(String)` - The new access token
    /// * `Err(ClientError::SessionExpired)` - No refresh token, or the server refused it
    /// * `Err(ClientError::NetworkError)` - The exchange did not complete; the session is kept
    pub async fn refresh_access_token(&self) -> Result<String> {
        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("No refresh token in session");
            self.expire_session();
            return Err(ClientError::SessionExpired);
        };
        let access_before = self.session.access_token();

        let (token_opt, failure_opt, shared) = self
            .refresh_singleflight
            .work(&refresh_token, self.exchange_refresh_token(&refresh_token))
            .await;

        match (token_opt, failure_opt) {
            (Some(token), _) => {
                debug!(shared = %shared, "Refresh completed");
                Ok(token)
            }
            (None, Some(RefreshFailure::Transport(err))) => {
                warn!(error = %err, "Token refresh did not reach the server");
                Err(ClientError::NetworkError(err))
            }
            (None, Some(RefreshFailure::Rejected(_))) => Err(ClientError::SessionExpired),
            // Waiters learn nothing from the group when the leader fails or is dropped,
            // so the outcome is read back from the session.
            (None, None) => self.settle_shared_refresh(&refresh_token, access_before),
        }
    }

    /// Resolve a coalesced refresh whose leader produced no shared result
    fn settle_shared_refresh(&self, refresh_token: &str, access_before: Option<String>) -> Result<String> {
        let current = self.session.snapshot();
        match (current.refresh_token, current.access_token) {
            (None, _) => {
                debug!("Session cleared by a rejected concurrent refresh");
                Err(ClientError::SessionExpired)
            }
            (Some(current_refresh), Some(access))
                if current_refresh != refresh_token || Some(&access) != access_before.as_ref() =>
            {
                debug!("Session refreshed by a concurrent request");
                Ok(access)
            }
            _ => {
                warn!("Shared token refresh did not complete");
                Err(ClientError::NetworkError("token refresh did not complete".to_string()))
            }
        }
    }

    /// Run one refresh exchange, clearing the session before waiters are released if it is rejected
    async fn exchange_refresh_token(&self, refresh_token: &str) -> std::result::Result<String, RefreshFailure> {
        let result = self.do_refresh(refresh_token).await;
        if let Err(RefreshFailure::Rejected(reason)) = &result {
            warn!(reason = %reason, "Token refresh rejected");
            self.expire_session();
        }
        result
    }

    async fn do_refresh(&self, refresh_token: &str) -> std::result::Result<String, RefreshFailure> {
        let url = self.config.endpoint_url(TOKEN_REFRESH_PATH);
        let response = self
            .http_client
            .post(&url)
            .json(&RefreshRequest { refresh: refresh_token })
            .send()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RefreshFailure::Rejected(format!("status {status}: {text}")));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RefreshFailure::Rejected(format!("malformed refresh response: {e}")))?;
        if body.access.is_empty() {
            return Err(RefreshFailure::Rejected("refresh response has an empty access token".to_string()));
        }

        let tokens = TokenPair {
            access_token: body.access,
            refresh_token: body.refresh.unwrap_or_else(|| refresh_token.to_string()),
        };
        self.session
            .store_tokens(&tokens)
            .map_err(|e| RefreshFailure::Rejected(e.to_string()))?;
        info!("Access token refreshed successfully");

        Ok(tokens.access_token)
    }

    fn expire_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
    }
}

impl ApiRequester for ApiClient {
    async fn request(&self, method: ApiMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        ApiClient::request(self, method, path, body).await
    }
}

impl<R: ApiRequester> ApiRequester for Arc<R> {
    async fn request(&self, method: ApiMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        R::request(self, method, path, body).await
    }
}

/// Parse a successful body. An empty body (e.g. 204) is `null`.
async fn read_json(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}
