#![allow(dead_code)]

use engdash_client::{ApiClient, ClientConfig, SessionStore, TokenPair};
use httpmock::MockServer;
use std::sync::Arc;

pub fn client_for(server: &MockServer) -> Arc<ApiClient> {
    ApiClient::with_session(ClientConfig::new(server.url("/api")), SessionStore::in_memory()).unwrap()
}

pub fn signed_in(server: &MockServer, access: &str, refresh: &str) -> Arc<ApiClient> {
    signed_in_with(ClientConfig::new(server.url("/api")), access, refresh)
}

pub fn signed_in_with(config: ClientConfig, access: &str, refresh: &str) -> Arc<ApiClient> {
    let client = ApiClient::with_session(config, SessionStore::in_memory()).unwrap();
    client
        .session()
        .store_tokens(&TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        })
        .unwrap();
    client
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
