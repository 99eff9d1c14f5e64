//! Checkout session commands.
//!
//! # Usage
//!
//! ```bash
//! rp-cli session ensure
//! rp-cli session show
//! rp-cli session reset
//! ```
//!
//! # Environment Variables
//!
//! - `RP_N8N_BASE` - Webhook backend base URL (required)
//! - `RP_SALEOR_CHANNEL` - Sales channel for checkout creation
//! - `RP_DEBUG` - Verbose lifecycle logging when `true`/`1`
//! - `RP_CONFIG_OVERRIDES` - JSON override object (highest precedence)

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use romanpie_core::CartLine;
use romanpie_session::{
    ConfigSources, FileCookieStore, FileKeyValueStore, PersistenceAdapter, SessionConfig,
    SessionError, SessionEvents, SessionHandle, WebhookBackend, config::attrs,
};

/// Errors that can occur during session commands.
#[derive(Debug, Error)]
pub enum SessionCliError {
    /// The `RP_CONFIG_OVERRIDES` value is not a valid override object.
    #[error("Invalid RP_CONFIG_OVERRIDES: {0}")]
    InvalidOverrides(#[from] serde_json::Error),

    /// Session lifecycle or configuration failure.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Run the full token lifecycle and print the resulting session.
pub async fn ensure(state_dir: &Path) -> Result<(), SessionCliError> {
    let sources = sources_from_env()?;
    let config = SessionConfig::resolve(&sources).map_err(SessionError::from)?;
    let backend = WebhookBackend::new(&config);
    let (kv, cookies) = stores(state_dir);
    let handle = SessionHandle::new(config, kv, cookies, backend);

    tracing::info!("Refreshing checkout session...");
    let token = handle.refresh().await?;

    print_session(Some(token.as_str()), &handle.cart());
    Ok(())
}

/// Print the stored token and cart without touching the network.
pub fn show(state_dir: &Path) -> Result<(), SessionCliError> {
    let adapter = adapter_from_env(state_dir)?;
    let token = adapter.read_token();
    print_session(token.as_ref().map(|t| t.as_str()), &adapter.read_cart());
    Ok(())
}

/// Clear the stored token, cookie, and cart cache.
pub fn reset(state_dir: &Path) -> Result<(), SessionCliError> {
    let adapter = adapter_from_env(state_dir)?;
    adapter.clear_token();
    adapter.save_cart(vec![]);
    tracing::info!("Session state cleared");
    Ok(())
}

/// Build configuration sources from environment variables.
///
/// Loads `.env` first. Environment variables fill the attribute layer;
/// `RP_CONFIG_OVERRIDES` (JSON) fills the override layer.
fn sources_from_env() -> Result<ConfigSources, SessionCliError> {
    dotenvy::dotenv().ok();

    let mut sources = ConfigSources::default();
    for (var, attr) in [
        ("RP_N8N_BASE", attrs::BACKEND_BASE),
        ("RP_SALEOR_CHANNEL", attrs::CHANNEL),
        ("RP_DEBUG", attrs::DEBUG),
    ] {
        if let Ok(value) = std::env::var(var) {
            sources = sources.with_attribute(attr, &value);
        }
    }

    if let Ok(raw) = std::env::var("RP_CONFIG_OVERRIDES") {
        sources = sources.with_overrides(serde_json::from_str(&raw)?);
    }

    Ok(sources)
}

fn stores(state_dir: &Path) -> (Arc<FileKeyValueStore>, Arc<FileCookieStore>) {
    (
        Arc::new(FileKeyValueStore::new(state_dir.join("state.json"))),
        Arc::new(FileCookieStore::new(state_dir.join("cookies.json"))),
    )
}

/// Build a persistence adapter over the state directory, without a backend.
fn adapter_from_env(state_dir: &Path) -> Result<PersistenceAdapter, SessionCliError> {
    let config = SessionConfig::resolve(&sources_from_env()?).map_err(SessionError::from)?;
    let (kv, cookies) = stores(state_dir);
    Ok(PersistenceAdapter::new(
        kv,
        cookies,
        &config,
        SessionEvents::new(),
    ))
}

#[allow(clippy::print_stdout)]
fn print_session(token: Option<&str>, lines: &[CartLine]) {
    match token {
        Some(token) => println!("token: {token}"),
        None => println!("token: (none)"),
    }
    if lines.is_empty() {
        println!("cart: (empty)");
    } else {
        println!("cart:");
        for line in lines {
            println!("  {} x{}", line.variant_id, line.quantity);
        }
    }
}
