//! Session storage: typed access to the token pair and cached profile
//!
//! Every read and write of the session goes through [`SessionStore`], which owns
//! the one canonical key set. Backing storage is a string key-value store, either
//! in memory (Papaya HashMap) or a JSON file that survives restarts.

use crate::error::{ClientError, Result};
use crate::types::{Session, TokenPair, UserProfile};
use papaya::HashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Key names written by older dashboard pages, migrated on open
const LEGACY_KEYS: [(&str, &str); 2] = [("access", ACCESS_TOKEN_KEY), ("refresh", REFRESH_TOKEN_KEY)];

/// Persistent string key-value storage backing a session
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Write all entries as one update
    fn set(&self, entries: &[(&str, &str)]) -> Result<()>;

    fn remove(&self, keys: &[&str]) -> Result<()>;
}

/// Process-local storage using Papaya HashMap
#[derive(Clone)]
pub struct MemoryStorage {
    entries: Arc<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.pin().get(key).cloned()
    }

    fn set(&self, entries: &[(&str, &str)]) -> Result<()> {
        let map = self.entries.pin();
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<()> {
        let map = self.entries.pin();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Storage kept as a JSON object on disk, rewritten on every change
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) a storage file. A missing file is an empty storage.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ClientError::Storage(format!("{} is not a session file: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ClientError::Storage(format!("Failed to read {}: {e}", path.display())));
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClientError::Storage("session file lock poisoned".to_string()))?;
        apply(&mut entries);

        let contents = serde_json::to_vec_pretty(&*entries)
            .map_err(|e| ClientError::Storage(format!("Failed to encode session: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| ClientError::Storage(format!("Failed to write {}: {e}", self.path.display())))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove(&self, keys: &[&str]) -> Result<()> {
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}

/// Single source of truth for the current auth session
///
/// Cheap to clone; clones share the same storage. Readers and writers are
/// serialized so the token pair is never observed half-updated.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    guard: Arc<RwLock<()>>,
}

impl SessionStore {
    /// Wrap a storage, migrating legacy key names into the canonical ones
    pub fn new(storage: impl KeyValueStorage + 'static) -> Result<Self> {
        let store = Self {
            storage: Arc::new(storage),
            guard: Arc::new(RwLock::new(())),
        };
        store.migrate_legacy_keys()?;
        Ok(store)
    }

    /// Session kept in memory for the lifetime of the process
    pub fn in_memory() -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            guard: Arc::new(RwLock::new(())),
        }
    }

    /// Session persisted to a JSON file
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(FileStorage::open(path)?)
    }

    fn migrate_legacy_keys(&self) -> Result<()> {
        let _write = self.guard.write().unwrap_or_else(|e| e.into_inner());
        for (legacy, canonical) in LEGACY_KEYS {
            let Some(value) = self.storage.get(legacy) else {
                continue;
            };
            if self.storage.get(canonical).is_none() {
                self.storage.set(&[(canonical, value.as_str())])?;
                info!(from = %legacy, to = %canonical, "Migrated legacy session key");
            }
            self.storage.remove(&[legacy])?;
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        self.storage.get(key).filter(|v| !v.is_empty())
    }

    /// Current access token, if any
    pub fn access_token(&self) -> Option<String> {
        let _read = self.guard.read().unwrap_or_else(|e| e.into_inner());
        self.read(ACCESS_TOKEN_KEY)
    }

    /// Current refresh token, if any
    pub fn refresh_token(&self) -> Option<String> {
        let _read = self.guard.read().unwrap_or_else(|e| e.into_inner());
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Both tokens, read together
    pub fn tokens(&self) -> Option<TokenPair> {
        let _read = self.guard.read().unwrap_or_else(|e| e.into_inner());
        Some(TokenPair {
            access_token: self.read(ACCESS_TOKEN_KEY)?,
            refresh_token: self.read(REFRESH_TOKEN_KEY)?,
        })
    }

    /// Cached user profile. An unreadable cached value is treated as absent.
    pub fn user(&self) -> Option<UserProfile> {
        let _read = self.guard.read().unwrap_or_else(|e| e.into_inner());
        self.read_user()
    }

    fn read_user(&self) -> Option<UserProfile> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached user profile");
                None
            }
        }
    }

    pub fn snapshot(&self) -> Session {
        let _read = self.guard.read().unwrap_or_else(|e| e.into_inner());
        Session {
            access_token: self.read(ACCESS_TOKEN_KEY),
            refresh_token: self.read(REFRESH_TOKEN_KEY),
            user: self.read_user(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist both tokens in one update
    pub fn store_tokens(&self, tokens: &TokenPair) -> Result<()> {
        let _write = self.guard.write().unwrap_or_else(|e| e.into_inner());
        self.storage.set(&[
            (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
        ])?;
        debug!("Stored token pair");
        Ok(())
    }

    pub fn store_user(&self, user: &UserProfile) -> Result<()> {
        let encoded = serde_json::to_string(user)
            .map_err(|e| ClientError::Storage(format!("Failed to encode user profile: {e}")))?;
        let _write = self.guard.write().unwrap_or_else(|e| e.into_inner());
        self.storage.set(&[(USER_KEY, encoded.as_str())])
    }

    /// Remove tokens and cached profile
    pub fn clear(&self) -> Result<()> {
        let _write = self.guard.write().unwrap_or_else(|e| e.into_inner());
        self.storage.remove(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY])?;
        info!("Session cleared");
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
