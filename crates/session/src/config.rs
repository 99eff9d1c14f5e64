//! Session configuration resolved from layered sources.
//!
//! Three sources merge per-key with increasing precedence:
//!
//! 1. built-in defaults
//! 2. embedded attributes (the `data-n8n-base` / `data-saleor-channel` /
//!    `data-debug` attribute map the host provides; the CLI fills this from
//!    environment variables)
//! 3. a global override object ([`ConfigOverrides`]), deserializable from JSON
//!
//! Only the backend base URL is validated. Its absence is fatal to
//! initialization; every other key falls back to a default.

use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

use romanpie_core::ChannelId;

use crate::error::ConfigError;

/// Default key-value storage key for the token record.
pub const DEFAULT_TOKEN_KEY: &str = "rp.checkoutToken";
/// Default key-value storage key for the cart snapshot.
pub const DEFAULT_CART_KEY: &str = "rp.cart";
/// Default cookie name mirroring the raw token.
pub const DEFAULT_COOKIE_NAME: &str = "rp_ct";
/// Default cookie lifetime in days.
pub const DEFAULT_COOKIE_TTL_DAYS: u32 = 30;
/// Default sales channel when none is configured.
pub const DEFAULT_CHANNEL: &str = "default-channel";

/// Attribute names recognized in the embedded attribute source.
pub mod attrs {
    /// Backend (n8n webhook) base URL.
    pub const BACKEND_BASE: &str = "data-n8n-base";
    /// Sales channel passed to checkout creation.
    pub const CHANNEL: &str = "data-saleor-channel";
    /// Enables verbose lifecycle logging when `true`/`1`.
    pub const DEBUG: &str = "data-debug";
}

/// Key-value storage keys for persisted session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key holding the token record JSON.
    pub token: String,
    /// Key holding the cart snapshot JSON.
    pub cart: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN_KEY.to_owned(),
            cart: DEFAULT_CART_KEY.to_owned(),
        }
    }
}

/// Fully resolved session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the webhook backend.
    pub backend_base_url: Url,
    /// Sales channel for checkout creation.
    pub channel: ChannelId,
    /// Key-value storage keys.
    pub storage_keys: StorageKeys,
    /// Cookie name mirroring the raw token.
    pub cookie_name: String,
    /// Cookie lifetime in days.
    pub cookie_ttl_days: u32,
    /// Verbose lifecycle logging.
    pub debug_enabled: bool,
}

/// The highest-precedence configuration source.
///
/// All fields optional; present fields override the attribute source and the
/// defaults per-key. Deserializes from the host's override object, e.g.
/// `{"backendBaseUrl": "...", "cookieTtlDays": 7}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    /// Backend base URL.
    pub backend_base_url: Option<String>,
    /// Sales channel.
    pub channel: Option<String>,
    /// Token record storage key.
    pub token_key: Option<String>,
    /// Cart snapshot storage key.
    pub cart_key: Option<String>,
    /// Cookie name.
    pub cookie_name: Option<String>,
    /// Cookie lifetime in days.
    pub cookie_ttl_days: Option<u32>,
    /// Verbose lifecycle logging.
    pub debug: Option<bool>,
}

/// The raw configuration sources a host hands to initialization.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Embedded attribute map (`data-n8n-base` etc.).
    pub attributes: HashMap<String, String>,
    /// Optional global override object.
    pub overrides: Option<ConfigOverrides>,
}

impl ConfigSources {
    /// Builder-style attribute insertion.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Builder-style override installation.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

impl SessionConfig {
    /// Resolve a configuration from layered sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBackendUrl`] when no source provides a
    /// backend base URL, or [`ConfigError::InvalidBackendUrl`] when the
    /// provided value does not parse.
    pub fn resolve(sources: &ConfigSources) -> Result<Self, ConfigError> {
        let overrides = sources.overrides.clone().unwrap_or_default();

        let raw_base = overrides
            .backend_base_url
            .or_else(|| non_empty(sources.attributes.get(attrs::BACKEND_BASE)))
            .ok_or(ConfigError::MissingBackendUrl)?;
        let backend_base_url =
            Url::parse(raw_base.trim()).map_err(|source| ConfigError::InvalidBackendUrl {
                value: raw_base.clone(),
                source,
            })?;

        // Channel is presence-checked only: an unusable value falls back to
        // the default rather than aborting initialization.
        let channel = overrides
            .channel
            .or_else(|| non_empty(sources.attributes.get(attrs::CHANNEL)))
            .and_then(|raw| ChannelId::parse(&raw).ok())
            .unwrap_or_else(default_channel);

        let debug_enabled = overrides.debug.unwrap_or_else(|| {
            sources
                .attributes
                .get(attrs::DEBUG)
                .is_some_and(|raw| flag_enabled(raw))
        });

        Ok(Self {
            backend_base_url,
            channel,
            storage_keys: StorageKeys {
                token: overrides.token_key.unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_owned()),
                cart: overrides.cart_key.unwrap_or_else(|| DEFAULT_CART_KEY.to_owned()),
            },
            cookie_name: overrides
                .cookie_name
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_owned()),
            cookie_ttl_days: overrides.cookie_ttl_days.unwrap_or(DEFAULT_COOKIE_TTL_DAYS),
            debug_enabled,
        })
    }

    /// Join an endpoint path onto the backend base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn default_channel() -> ChannelId {
    ChannelId::parse(DEFAULT_CHANNEL).expect("DEFAULT_CHANNEL is a non-empty channel id")
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn flag_enabled(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_sources() -> ConfigSources {
        ConfigSources::default().with_attribute(attrs::BACKEND_BASE, "https://flows.example.com")
    }

    #[test]
    fn test_defaults_apply() {
        let config = SessionConfig::resolve(&base_sources()).unwrap();
        assert_eq!(config.storage_keys.token, "rp.checkoutToken");
        assert_eq!(config.storage_keys.cart, "rp.cart");
        assert_eq!(config.cookie_name, "rp_ct");
        assert_eq!(config.cookie_ttl_days, 30);
        assert_eq!(config.channel.as_str(), "default-channel");
        assert!(!config.debug_enabled);
    }

    #[test]
    fn test_missing_backend_url_is_fatal() {
        let result = SessionConfig::resolve(&ConfigSources::default());
        assert!(matches!(result, Err(ConfigError::MissingBackendUrl)));
    }

    #[test]
    fn test_blank_backend_url_is_missing() {
        let sources = ConfigSources::default().with_attribute(attrs::BACKEND_BASE, "   ");
        let result = SessionConfig::resolve(&sources);
        assert!(matches!(result, Err(ConfigError::MissingBackendUrl)));
    }

    #[test]
    fn test_invalid_backend_url() {
        let sources = ConfigSources::default().with_attribute(attrs::BACKEND_BASE, "not a url");
        let result = SessionConfig::resolve(&sources);
        assert!(matches!(result, Err(ConfigError::InvalidBackendUrl { .. })));
    }

    #[test]
    fn test_attributes_override_defaults() {
        let sources = base_sources()
            .with_attribute(attrs::CHANNEL, "eu")
            .with_attribute(attrs::DEBUG, "true");
        let config = SessionConfig::resolve(&sources).unwrap();
        assert_eq!(config.channel.as_str(), "eu");
        assert!(config.debug_enabled);
    }

    #[test]
    fn test_overrides_win_over_attributes() {
        let sources = base_sources()
            .with_attribute(attrs::CHANNEL, "eu")
            .with_overrides(ConfigOverrides {
                backend_base_url: Some("https://other.example.com/webhook".to_owned()),
                channel: Some("us".to_owned()),
                cookie_ttl_days: Some(7),
                ..ConfigOverrides::default()
            });
        let config = SessionConfig::resolve(&sources).unwrap();
        assert_eq!(
            config.backend_base_url.as_str(),
            "https://other.example.com/webhook"
        );
        assert_eq!(config.channel.as_str(), "us");
        assert_eq!(config.cookie_ttl_days, 7);
    }

    #[test]
    fn test_overrides_merge_per_key() {
        // An override object that only sets one key leaves the rest to the
        // lower-precedence sources.
        let sources = base_sources()
            .with_attribute(attrs::CHANNEL, "eu")
            .with_overrides(ConfigOverrides {
                cookie_name: Some("custom_ct".to_owned()),
                ..ConfigOverrides::default()
            });
        let config = SessionConfig::resolve(&sources).unwrap();
        assert_eq!(config.cookie_name, "custom_ct");
        assert_eq!(config.channel.as_str(), "eu");
    }

    #[test]
    fn test_overrides_deserialize_from_json() {
        let overrides: ConfigOverrides = serde_json::from_str(
            r#"{"backendBaseUrl": "https://x.example.com", "cookieTtlDays": 7, "debug": true}"#,
        )
        .unwrap();
        assert_eq!(
            overrides.backend_base_url.as_deref(),
            Some("https://x.example.com")
        );
        assert_eq!(overrides.cookie_ttl_days, Some(7));
        assert_eq!(overrides.debug, Some(true));
    }

    #[test]
    fn test_unusable_channel_falls_back() {
        let sources = base_sources().with_attribute(attrs::CHANNEL, "   ");
        let config = SessionConfig::resolve(&sources).unwrap();
        assert_eq!(config.channel.as_str(), "default-channel");
    }

    #[test]
    fn test_endpoint_join() {
        let sources = ConfigSources::default()
            .with_attribute(attrs::BACKEND_BASE, "https://flows.example.com/webhook/");
        let config = SessionConfig::resolve(&sources).unwrap();
        assert_eq!(
            config.endpoint("checkout/create"),
            "https://flows.example.com/webhook/checkout/create"
        );
        assert_eq!(
            config.endpoint("/checkout/get"),
            "https://flows.example.com/webhook/checkout/get"
        );
    }

    #[test]
    fn test_debug_flag_values() {
        for (raw, expected) in [("true", true), ("1", true), ("false", false), ("no", false)] {
            let sources = base_sources().with_attribute(attrs::DEBUG, raw);
            let config = SessionConfig::resolve(&sources).unwrap();
            assert_eq!(config.debug_enabled, expected, "raw attribute {raw:?}");
        }
    }
}
