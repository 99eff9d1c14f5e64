//! Webhook backend client.
//!
//! The backend is a workflow-automation webhook wrapping the commerce
//! backend's checkout-create and checkout-get operations. Both endpoints
//! take a form-encoded POST with no custom headers - the flat content type
//! keeps browser-origin callers out of preflight territory, and the server
//! side accepts it, so the native client sends the same shape.

mod payload;

pub use payload::{CheckoutPayload, parse_checkout_payload};

use std::future::Future;

use tracing::{debug, instrument};

use romanpie_core::{ChannelId, CheckoutToken};

use crate::config::SessionConfig;
use crate::error::BackendError;

/// A backend response body: structured when it parsed as JSON, otherwise the
/// raw text. Callers must tolerate either shape.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    /// The body parsed as JSON.
    Json(serde_json::Value),
    /// The body did not parse; raw text retained.
    Text(String),
}

/// The checkout operations the session lifecycle needs.
///
/// A trait so tests (and alternative transports) can stand in for the
/// webhook; [`WebhookBackend`] is the production implementation.
pub trait CheckoutBackend: Send + Sync {
    /// Create a new checkout under `channel`.
    fn create_checkout(
        &self,
        channel: &ChannelId,
    ) -> impl Future<Output = Result<CheckoutPayload, BackendError>> + Send;

    /// Fetch the checkout behind `token`, if the backend still knows it.
    fn validate_checkout(
        &self,
        token: &CheckoutToken,
    ) -> impl Future<Output = Result<CheckoutPayload, BackendError>> + Send;
}

/// HTTP client for the webhook backend.
#[derive(Debug, Clone)]
pub struct WebhookBackend {
    client: reqwest::Client,
    create_url: String,
    get_url: String,
}

impl WebhookBackend {
    /// Create a client for the backend configured in `config`.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            create_url: config.endpoint("checkout/create"),
            get_url: config.endpoint("checkout/get"),
        }
    }

    /// POST a flat field map as form-encoded content.
    ///
    /// A non-success status is an error carrying the status code. The body is
    /// returned parsed when it is JSON, raw otherwise.
    #[instrument(skip(self, fields))]
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> Result<ResponseBody, BackendError> {
        let response = self.client.post(url).form(fields).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "backend returned non-success status");
            return Err(BackendError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text).map_or(ResponseBody::Text(text), ResponseBody::Json))
    }
}

impl CheckoutBackend for WebhookBackend {
    async fn create_checkout(&self, channel: &ChannelId) -> Result<CheckoutPayload, BackendError> {
        let body = self
            .post_form(&self.create_url, &[("channel", channel.as_str())])
            .await?;
        Ok(parse_checkout_payload(&body))
    }

    async fn validate_checkout(
        &self,
        token: &CheckoutToken,
    ) -> Result<CheckoutPayload, BackendError> {
        let body = self
            .post_form(&self.get_url, &[("token", token.as_str())])
            .await?;
        Ok(parse_checkout_payload(&body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{ConfigSources, attrs};

    #[test]
    fn test_endpoint_urls() {
        let sources = ConfigSources::default()
            .with_attribute(attrs::BACKEND_BASE, "https://flows.example.com/webhook");
        let config = SessionConfig::resolve(&sources).unwrap();
        let backend = WebhookBackend::new(&config);

        assert_eq!(
            backend.create_url,
            "https://flows.example.com/webhook/checkout/create"
        );
        assert_eq!(
            backend.get_url,
            "https://flows.example.com/webhook/checkout/get"
        );
    }
}
