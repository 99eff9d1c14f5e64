//! The session handle and token lifecycle.
//!
//! [`SessionHandle`] is the public surface of the session manager: a handle
//! returned from initialization, holding the last-resolved token for
//! synchronous access and exposing the lifecycle as `refresh`. The lifecycle
//! composes four states:
//!
//! - `NoToken --create--> TokenValid`
//! - `TokenPresentUnvalidated --validate--> TokenValid | TokenInvalid`
//! - `TokenInvalid --discard--> NoToken` (create fires within the same call)
//!
//! One call chain runs to completion per refresh; there is no timeout, no
//! retry, and no coordination across execution contexts. Two contexts
//! refreshing at once can each create a checkout, with the last persisted
//! write winning - accepted behavior, mitigated only by the cookie mirror.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use romanpie_core::{CartLine, CheckoutToken};

use crate::backend::{CheckoutBackend, WebhookBackend};
use crate::config::{ConfigSources, SessionConfig};
use crate::error::SessionError;
use crate::events::{SessionEvent, SessionEvents};
use crate::store::{CookieStore, KeyValueStore, PersistenceAdapter};

/// Where a token is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No persisted token.
    NoToken,
    /// A persisted token exists but has not been checked this chain.
    TokenPresentUnvalidated(CheckoutToken),
    /// The backend accepted the token.
    TokenValid(CheckoutToken),
    /// The backend rejected the token (or the call failed).
    TokenInvalid(CheckoutToken),
}

/// Handle to the checkout session.
///
/// Generic over the backend so tests and alternative transports can stand in
/// for the webhook.
pub struct SessionHandle<B> {
    config: SessionConfig,
    adapter: PersistenceAdapter,
    backend: B,
    events: SessionEvents,
    current: RwLock<Option<CheckoutToken>>,
}

impl SessionHandle<WebhookBackend> {
    /// Resolve configuration, build the webhook client, and run the lifecycle
    /// once.
    ///
    /// A configuration failure aborts initialization: it is logged and
    /// returned, and no handle is produced. A backend failure during the
    /// initial refresh is only logged - the handle is still returned and a
    /// later [`refresh`](Self::refresh) can recover.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when no usable backend base URL is
    /// configured.
    pub async fn initialize(
        sources: &ConfigSources,
        kv: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieStore>,
    ) -> Result<Self, SessionError> {
        Self::initialize_with(sources, kv, cookies, WebhookBackend::new).await
    }
}

impl<B: CheckoutBackend> SessionHandle<B> {
    /// Initialization over an arbitrary backend, built from the resolved
    /// configuration; the webhook `initialize` wraps this.
    ///
    /// Same contract: a configuration failure is logged and returned with no
    /// handle produced; a backend failure during the initial refresh is
    /// logged only, leaving a handle with no resolved token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when no usable backend base URL is
    /// configured.
    pub async fn initialize_with(
        sources: &ConfigSources,
        kv: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieStore>,
        make_backend: impl FnOnce(&SessionConfig) -> B,
    ) -> Result<Self, SessionError> {
        let config = match SessionConfig::resolve(sources) {
            Ok(config) => config,
            Err(err) => {
                error!(error = %err, "session initialization aborted");
                return Err(err.into());
            }
        };
        let backend = make_backend(&config);
        let handle = Self::new(config, kv, cookies, backend);
        if let Err(err) = handle.refresh().await {
            error!(error = %err, "initial session refresh failed");
        }
        Ok(handle)
    }

    /// Build a handle without running the lifecycle; callers refresh when
    /// ready.
    pub fn new(
        config: SessionConfig,
        kv: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieStore>,
        backend: B,
    ) -> Self {
        let events = SessionEvents::new();
        let adapter = PersistenceAdapter::new(kv, cookies, &config, events.clone());
        Self {
            config,
            adapter,
            backend,
            events,
            current: RwLock::new(None),
        }
    }

    /// The last resolved token, synchronously.
    ///
    /// Stale until this handle's own `refresh` runs - external writes are
    /// deliberately not reflected here.
    #[must_use]
    pub fn token(&self) -> Option<CheckoutToken> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    /// The cached cart lines, read through from persistence.
    #[must_use]
    pub fn cart(&self) -> Vec<CartLine> {
        self.adapter.read_cart()
    }

    /// Subscribe to session notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Feed a token-key write observed in another execution context.
    ///
    /// Mirrors the value into the cookie only. The in-memory token is left
    /// untouched, so [`token`](Self::token) keeps returning the stale value
    /// until this context refreshes.
    pub fn apply_external_token_change(&self, raw: Option<&str>) {
        self.adapter.mirror_external_token(raw);
    }

    /// Run the full lifecycle: read, validate if present, create if absent
    /// or invalid, persist, and return the resulting token.
    ///
    /// Idempotent for an already-valid token: the stored token is
    /// re-validated and its timestamp refreshed, never recreated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Backend`] when the create call fails and
    /// [`SessionError::NoTokenIssued`] when the create response carries no
    /// token. Validation failures never surface here; they trigger
    /// re-creation within the same call.
    pub async fn refresh(&self) -> Result<CheckoutToken, SessionError> {
        let mut state = self
            .adapter
            .read_token()
            .map_or(SessionState::NoToken, SessionState::TokenPresentUnvalidated);

        if let SessionState::TokenPresentUnvalidated(existing) = state {
            state = self.validate(existing).await;
        }

        let token = match state {
            SessionState::TokenValid(token) => token,
            SessionState::TokenInvalid(stale) => {
                if self.config.debug_enabled {
                    debug!(stale = %stale, "discarding rejected token");
                }
                self.adapter.clear_token();
                self.create().await?
            }
            SessionState::NoToken | SessionState::TokenPresentUnvalidated(_) => {
                self.create().await?
            }
        };

        if let Ok(mut current) = self.current.write() {
            *current = Some(token.clone());
        }
        Ok(token)
    }

    /// Check a stored token against the backend.
    ///
    /// Accepted iff the response echoes a token or yields any checkout
    /// object. On acceptance the (possibly re-echoed) token is persisted to
    /// refresh its timestamp and the cart cache is overwritten wholesale,
    /// empty included. Transport and shape failures collapse to invalid.
    async fn validate(&self, token: CheckoutToken) -> SessionState {
        match self.backend.validate_checkout(&token).await {
            Ok(payload) if payload.is_valid_session() => {
                let accepted = payload.token.unwrap_or(token);
                self.adapter.save_token(&accepted);
                self.adapter.save_cart(payload.lines);
                SessionState::TokenValid(accepted)
            }
            Ok(_) => SessionState::TokenInvalid(token),
            Err(err) => {
                warn!(error = %err, "checkout validation failed");
                SessionState::TokenInvalid(token)
            }
        }
    }

    /// Create a fresh checkout and persist its token and cart.
    async fn create(&self) -> Result<CheckoutToken, SessionError> {
        let payload = self.backend.create_checkout(&self.config.channel).await?;
        let token = payload.token.ok_or(SessionError::NoTokenIssued)?;
        self.adapter.save_token(&token);
        self.adapter.save_cart(payload.lines);
        if self.config.debug_enabled {
            debug!(token = %token, "created checkout session");
        }
        Ok(token)
    }
}
