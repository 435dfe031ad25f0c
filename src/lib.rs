//! Engineering dashboard client
//!
//! A Rust client library for the maintenance-engineering dashboard API,
//! with bearer-token authentication, transparent token refresh, a typed
//! session store, and defensive loaders for the dashboard's pages.

pub mod auth_client;
pub mod coerce;
pub mod config;
pub mod error;
pub mod loader;
pub mod navigation;
pub mod resources;
pub mod session_store;
pub mod types;

pub use auth_client::{ApiClient, ApiRequester};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use loader::{LoadIssue, ViewState};
pub use session_store::{FileStorage, KeyValueStorage, MemoryStorage, SessionStore};
pub use types::{ApiMethod, LoginOutcome, Role, Session, TokenPair, UserProfile};
