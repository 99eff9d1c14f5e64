//! RomanPie checkout session manager.
//!
//! Maintains a persistent checkout session token for a storefront, backed by
//! a remote workflow-automation webhook that proxies to the commerce backend.
//! The token lives in a key-value store and a cookie; on every refresh it is
//! validated against the backend and recreated when missing or rejected. A
//! simplified view of the checkout's line items is cached alongside it.
//!
//! # Architecture
//!
//! - [`SessionHandle`] owns the lifecycle: read, validate-if-present,
//!   create-if-absent-or-invalid, persist, return
//! - Persistence surfaces are traits ([`KeyValueStore`], [`CookieStore`]) so
//!   hosts can plug in whatever storage they have; in-memory and file-backed
//!   implementations ship with the crate
//! - Cart overwrites are announced on a broadcast channel ([`SessionEvent`])
//!   so co-resident code can react
//! - Cross-context writes to the token key are mirrored into the cookie only,
//!   never re-validated
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use romanpie_session::{
//!     ConfigSources, MemoryCookieStore, MemoryKeyValueStore, SessionHandle,
//! };
//!
//! let sources = ConfigSources::default()
//!     .with_attribute("data-n8n-base", "https://flows.example.com/webhook");
//! let handle = SessionHandle::initialize(
//!     &sources,
//!     Arc::new(MemoryKeyValueStore::new()),
//!     Arc::new(MemoryCookieStore::new()),
//! )
//! .await?;
//!
//! let token = handle.refresh().await?;
//! let cart = handle.cart();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod store;

pub use backend::{
    CheckoutBackend, CheckoutPayload, ResponseBody, WebhookBackend, parse_checkout_payload,
};
pub use config::{ConfigOverrides, ConfigSources, SessionConfig, StorageKeys};
pub use error::{BackendError, ConfigError, SessionError};
pub use events::{SessionEvent, SessionEvents};
pub use handle::{SessionHandle, SessionState};
pub use store::{
    CookieAttributes, CookieStore, FileCookieStore, FileKeyValueStore, KeyValueStore,
    MemoryCookieStore, MemoryKeyValueStore, PersistenceAdapter, SameSite,
};
