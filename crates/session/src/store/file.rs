//! File-backed persistence surfaces.
//!
//! Each store is one JSON document on disk, read on every access so writes
//! from other processes are observed. Writes are best-effort read-modify-write
//! of the whole document; any I/O or parse failure degrades to "no data".

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use super::{CookieAttributes, CookieStore, KeyValueStore};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A [`KeyValueStore`] backed by a single JSON file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store backed by the file at `path`. The file is created on
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries: HashMap<String, String> = load(&self.path)?;
        entries.remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries: HashMap<String, String> = load(&self.path).unwrap_or_default();
        entries.insert(key.to_owned(), value.to_owned());
        save(&self.path, &entries);
    }

    fn remove(&self, key: &str) {
        let Some(mut entries) = load::<HashMap<String, String>>(&self.path) else {
            return;
        };
        entries.remove(key);
        save(&self.path, &entries);
    }
}

/// One stored cookie: the value plus its computed expiry instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    #[serde(rename = "expiresAt")]
    expires_at_ms: i64,
}

/// A [`CookieStore`] backed by a single JSON file.
///
/// Honors the max-age attribute: expired cookies read as absent. Path and
/// `SameSite` have no meaning outside a browser and are dropped.
#[derive(Debug)]
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    /// Create a store backed by the file at `path`. The file is created on
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CookieStore for FileCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        let mut cookies: HashMap<String, StoredCookie> = load(&self.path)?;
        let cookie = cookies.remove(name)?;
        if cookie.expires_at_ms <= Utc::now().timestamp_millis() {
            return None;
        }
        Some(cookie.value)
    }

    fn set(&self, cookie: &CookieAttributes) {
        let mut cookies: HashMap<String, StoredCookie> = load(&self.path).unwrap_or_default();
        let expires_at_ms =
            Utc::now().timestamp_millis() + i64::from(cookie.max_age_days) * MS_PER_DAY;
        cookies.insert(
            cookie.name.clone(),
            StoredCookie {
                value: cookie.value.clone(),
                expires_at_ms,
            },
        );
        save(&self.path, &cookies);
    }

    fn clear(&self, name: &str) {
        let Some(mut cookies) = load::<HashMap<String, StoredCookie>>(&self.path) else {
            return;
        };
        cookies.remove(name);
        save(&self.path, &cookies);
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring corrupt store file");
            None
        }
    }
}

fn save<T: Serialize>(path: &Path, value: &T) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        && let Err(err) = std::fs::create_dir_all(parent)
    {
        debug!(path = %path.display(), error = %err, "failed to create store directory");
        return;
    }
    match serde_json::to_string(value) {
        Ok(json) => {
            if let Err(err) = std::fs::write(path, json) {
                debug!(path = %path.display(), error = %err, "failed to write store file");
            }
        }
        Err(err) => debug!(path = %path.display(), error = %err, "failed to serialize store"),
    }
}
