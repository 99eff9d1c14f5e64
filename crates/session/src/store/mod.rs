//! Persistence surfaces and the adapter that composes them.
//!
//! Durable state is owned by two host-provided surfaces: a key-value store
//! (token record and cart snapshot as JSON documents) and a small-string
//! cookie store with expiry (the raw token). Both traits are infallible by
//! contract - implementations swallow their own I/O errors and report
//! absence, so corrupt or inaccessible storage always degrades to "no data".

mod file;
mod memory;

pub use file::{FileCookieStore, FileKeyValueStore};
pub use memory::{MemoryCookieStore, MemoryKeyValueStore};

use std::sync::Arc;

use tracing::debug;

use romanpie_core::{CartLine, CartSnapshot, CheckoutToken, TokenRecord};

use crate::config::{SessionConfig, StorageKeys};
use crate::events::{SessionEvent, SessionEvents};

/// A key-value persistence surface (local storage, a JSON file, ...).
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any prior value. Best-effort.
    fn set(&self, key: &str, value: &str);
    /// Remove the value stored under `key`. Best-effort.
    fn remove(&self, key: &str);
}

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on top-level navigations and same-site requests.
    Lax,
    /// Sent on same-site requests only.
    Strict,
    /// Sent on all requests.
    None,
}

/// A cookie write, with the attributes this component always sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Cookie name.
    pub name: String,
    /// Cookie value (the raw token).
    pub value: String,
    /// Cookie path; always `/` here.
    pub path: String,
    /// `SameSite` policy; always `Lax` here.
    pub same_site: SameSite,
    /// Lifetime in days.
    pub max_age_days: u32,
}

/// A small-string persistence surface with expiry.
pub trait CookieStore: Send + Sync {
    /// Read the value of the cookie named `name`, if present and unexpired.
    fn get(&self, name: &str) -> Option<String>;
    /// Write a cookie. Best-effort.
    fn set(&self, cookie: &CookieAttributes);
    /// Remove the cookie named `name`. Best-effort.
    fn clear(&self, name: &str);
}

/// Composes the key-value store and cookie store into the operations the
/// session lifecycle needs.
#[derive(Clone)]
pub struct PersistenceAdapter {
    kv: Arc<dyn KeyValueStore>,
    cookies: Arc<dyn CookieStore>,
    keys: StorageKeys,
    cookie_name: String,
    cookie_ttl_days: u32,
    events: SessionEvents,
}

impl PersistenceAdapter {
    /// Create an adapter over the given surfaces.
    #[must_use]
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieStore>,
        config: &SessionConfig,
        events: SessionEvents,
    ) -> Self {
        Self {
            kv,
            cookies,
            keys: config.storage_keys.clone(),
            cookie_name: config.cookie_name.clone(),
            cookie_ttl_days: config.cookie_ttl_days,
            events,
        }
    }

    /// Persist `token`: a full [`TokenRecord`] overwrite in the key-value
    /// store, plus the raw token mirrored into the cookie.
    pub fn save_token(&self, token: &CheckoutToken) {
        let record = TokenRecord::new(token.clone());
        match serde_json::to_string(&record) {
            Ok(json) => self.kv.set(&self.keys.token, &json),
            Err(err) => debug!(error = %err, "failed to serialize token record"),
        }
        self.set_token_cookie(token.as_str());
    }

    /// Read the current token: the stored record, falling back to the cookie
    /// when the record is absent or corrupt. Never yields an empty token.
    #[must_use]
    pub fn read_token(&self) -> Option<CheckoutToken> {
        self.kv
            .get(&self.keys.token)
            .and_then(|raw| decode_stored_token(&raw))
            .or_else(|| {
                self.cookies
                    .get(&self.cookie_name)
                    .and_then(|raw| CheckoutToken::from_raw(&raw))
            })
    }

    /// Remove the persisted record and the cookie.
    pub fn clear_token(&self) {
        self.kv.remove(&self.keys.token);
        self.cookies.clear(&self.cookie_name);
    }

    /// Normalize `lines`, persist them as a fresh [`CartSnapshot`]
    /// (wholesale replacement), notify subscribers, and return the
    /// normalized lines.
    ///
    /// The line invariants are enforced at this boundary too: entries
    /// without a usable variant identifier are dropped and quantities are
    /// clamped to non-negative, whatever the caller hands in.
    pub fn save_cart(&self, lines: Vec<CartLine>) -> Vec<CartLine> {
        let lines: Vec<CartLine> = lines
            .into_iter()
            .filter_map(CartLine::into_normalized)
            .collect();
        let snapshot = CartSnapshot::new(lines.clone());
        match serde_json::to_string(&snapshot) {
            Ok(json) => self.kv.set(&self.keys.cart, &json),
            Err(err) => debug!(error = %err, "failed to serialize cart snapshot"),
        }
        self.events.publish(SessionEvent::CartUpdated {
            lines: lines.clone(),
        });
        lines
    }

    /// Read the last persisted cart lines; empty on absent or corrupt data.
    #[must_use]
    pub fn read_cart(&self) -> Vec<CartLine> {
        self.kv
            .get(&self.keys.cart)
            .and_then(|raw| serde_json::from_str::<CartSnapshot>(&raw).ok())
            .map(|snapshot| snapshot.lines)
            .unwrap_or_default()
    }

    /// Mirror a token value written by another execution context into the
    /// cookie. Does not re-validate and does not touch any in-memory cache.
    /// `None` (the key was removed) clears the cookie; a value that does not
    /// decode to a usable record is ignored.
    pub fn mirror_external_token(&self, raw: Option<&str>) {
        match raw {
            None => self.cookies.clear(&self.cookie_name),
            Some(raw) => match decode_stored_token(raw) {
                Some(token) => self.set_token_cookie(token.as_str()),
                None => debug!("ignoring undecodable external token value"),
            },
        }
    }

    fn set_token_cookie(&self, value: &str) {
        self.cookies.set(&CookieAttributes {
            name: self.cookie_name.clone(),
            value: value.to_owned(),
            path: "/".to_owned(),
            same_site: SameSite::Lax,
            max_age_days: self.cookie_ttl_days,
        });
    }
}

/// Decode a stored token record, yielding its token.
fn decode_stored_token(raw: &str) -> Option<CheckoutToken> {
    serde_json::from_str::<TokenRecord>(raw)
        .ok()
        .map(|record| record.token)
}
