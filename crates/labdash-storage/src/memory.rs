//! In-memory implementation of `TokenStore`.
//!
//! `MemoryTokenStore` holds a small key-value map behind a `Mutex`. Nothing
//! survives the process, which makes it the store of choice for tests and
//! the reference scenarios.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use labdash_contracts::error::{DashError, DashResult};
use labdash_core::traits::{TokenStore, TOKEN_KEY};

/// A volatile key-value store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if a previous session had
    /// persisted it.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(TOKEN_KEY.to_string(), token.into());
        }
        store
    }

    fn entries(&self) -> DashResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries.lock().map_err(|e| DashError::Storage {
            reason: format!("token store lock poisoned: {}", e),
        })
    }

    pub fn get(&self, key: &str) -> DashResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: &str) -> DashResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove(&self, key: &str) -> DashResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> DashResult<Option<String>> {
        self.get(TOKEN_KEY)
    }

    fn save(&self, token: &str) -> DashResult<()> {
        debug!("session token stored in memory");
        self.set(TOKEN_KEY, token)
    }

    fn clear(&self) -> DashResult<()> {
        debug!("session token removed from memory");
        self.remove(TOKEN_KEY)
    }
}
