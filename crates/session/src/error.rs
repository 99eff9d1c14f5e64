//! Error types for the session manager.
//!
//! Transport failures and shape failures both collapse to "operation failed"
//! at the validate step; only the create step surfaces errors to callers.

use thiserror::Error;

/// Errors from the webhook backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (network unreachable, connection refused, etc.).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend responded with a non-success status.
    #[error("backend returned status {0}")]
    Status(u16),
}

/// Errors that can occur while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No backend base URL in any configuration source.
    #[error("no backend base URL configured")]
    MissingBackendUrl,

    /// The configured backend base URL is not a valid URL.
    #[error("invalid backend base URL {value:?}: {source}")]
    InvalidBackendUrl {
        /// The offending configured value.
        value: String,
        /// Underlying parse failure.
        source: url::ParseError,
    },
}

/// Errors surfaced by the session lifecycle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration could not be resolved; initialization aborts.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend call behind a create attempt failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The create response carried no resolvable token.
    #[error("checkout create response carried no token")]
    NoTokenIssued,
}
