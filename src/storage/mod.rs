//! Local key-value storage
//!
//! The session token and the theme preference survive restarts through a
//! [`KeyValueStore`]. State stores receive the store by injection, so they
//! never depend on a concrete persistence mechanism.

mod encrypted;

pub use encrypted::EncryptedFileStore;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Key under which the bearer session token is persisted
pub const SESSION_TOKEN_KEY: &str = "session_token";

/// Key under which the display mode is persisted (`"dark"` or `"light"`)
pub const THEME_MODE_KEY: &str = "theme_mode";

/// Errors raised by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored payload could not be encrypted or decrypted
    #[error("storage encryption error: {0}")]
    Crypto(String),

    /// The decrypted payload was not a valid key-value document
    #[error("storage format error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string-keyed storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle used when several state stores persist through one backend
pub type SharedStore = Arc<dyn KeyValueStore>;

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process store, used by demo mode and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(SESSION_TOKEN_KEY).unwrap(), None);

        store.set(SESSION_TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        store.set(SESSION_TOKEN_KEY, "def").unwrap();
        assert_eq!(store.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("def"));

        store.remove(SESSION_TOKEN_KEY).unwrap();
        store.remove(SESSION_TOKEN_KEY).unwrap();
        assert_eq!(store.get(SESSION_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_shared_store_sees_same_values() {
        let shared: SharedStore = Arc::new(MemoryStore::new());
        let other = Arc::clone(&shared);

        shared.set(THEME_MODE_KEY, "light").unwrap();
        assert_eq!(other.get(THEME_MODE_KEY).unwrap().as_deref(), Some("light"));
    }
}
