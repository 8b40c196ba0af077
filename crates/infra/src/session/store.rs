//! Secure credential storage port and implementations
//!
//! The session layer treats credential storage as an opaque key-value store.
//! Production uses the platform keychain via the `keyring` crate; tests and
//! headless environments use the in-memory store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

/// Store key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Store key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Store key for the serialized user profile.
pub const USER_PROFILE_KEY: &str = "user_profile";

/// Error from the storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secure store backend error: {0}")]
    Backend(String),
}

/// Trait for secure secret storage
///
/// Missing keys are `Ok(None)`, not errors; deletion of a missing key is a
/// no-op. Callers must tolerate any of these operations failing without
/// crashing (log and continue with in-memory state).
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Read a value, `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, overwriting any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value; succeeds when the key is absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Platform keychain store (macOS Keychain, Windows Credential Manager,
/// Linux Secret Service) via the `keyring` crate.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Create a store namespaced under the given keychain service name.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, key)
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}

#[async_trait]
impl SecureStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(StoreError::Backend(err.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(key, "writing secret to keychain");
        self.entry(key)?.set_password(value).map_err(|err| StoreError::Backend(err.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(StoreError::Backend(err.to_string())),
        }
    }
}

/// In-memory store for tests and headless environments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a key currently holds a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}
