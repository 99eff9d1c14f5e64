//! In-memory persistence surfaces.
//!
//! Used by tests and by embedders that keep session state for the lifetime
//! of the process only. Cookie attributes beyond the value are accepted and
//! dropped; there is nothing to expire in memory.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{CookieAttributes, CookieStore, KeyValueStore};

/// An in-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        // A poisoned lock degrades to absence, per the storage contract.
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}

/// An in-memory [`CookieStore`].
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: RwLock<HashMap<String, String>>,
}

impl MemoryCookieStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .ok()
            .and_then(|cookies| cookies.get(name).cloned())
    }

    fn set(&self, cookie: &CookieAttributes) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.insert(cookie.name.clone(), cookie.value.clone());
        }
    }

    fn clear(&self, name: &str) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.remove(name);
        }
    }
}
