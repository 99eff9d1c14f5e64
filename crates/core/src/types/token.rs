//! Checkout session token types.
//!
//! A [`CheckoutToken`] is the opaque string handle the commerce backend
//! issues for a checkout. The persisted form is a [`TokenRecord`], which
//! pairs the token with a save timestamp and a schema version tag.

use core::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written into every new [`TokenRecord`].
pub const TOKEN_RECORD_VERSION: u32 = 1;

/// Errors that can occur when parsing a [`CheckoutToken`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CheckoutTokenError {
    /// The input string is empty or contains only whitespace.
    #[error("checkout token cannot be empty")]
    Empty,
}

/// An opaque checkout session token issued by the commerce backend.
///
/// ## Constraints
///
/// - Never empty or whitespace-only
/// - Surrounding whitespace is stripped on parse
///
/// ## Examples
///
/// ```
/// use romanpie_core::CheckoutToken;
///
/// assert!(CheckoutToken::parse("chk_a1b2c3").is_ok());
/// assert!(CheckoutToken::parse("  padded  ").is_ok());
///
/// assert!(CheckoutToken::parse("").is_err());
/// assert!(CheckoutToken::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CheckoutToken(String);

impl CheckoutToken {
    /// Parse a `CheckoutToken` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutTokenError::Empty`] if the trimmed input is empty.
    pub fn parse(s: &str) -> Result<Self, CheckoutTokenError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CheckoutTokenError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse a token from an untrusted source, mapping failure to `None`.
    ///
    /// Used wherever the contract is "a trimmed non-empty string or null" -
    /// stored values, cookie values, and echoed backend fields.
    #[must_use]
    pub fn from_raw(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CheckoutToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CheckoutToken {
    type Err = CheckoutTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CheckoutToken {
    type Error = CheckoutTokenError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CheckoutToken> for String {
    fn from(token: CheckoutToken) -> Self {
        token.0
    }
}

impl AsRef<str> for CheckoutToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The persisted form of a checkout token.
///
/// Serializes to the storage wire shape `{"token": .., "t": .., "version": ..}`
/// where `t` is epoch milliseconds. `version` is optional on read so records
/// written before the tag existed still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRecord {
    /// The token itself.
    pub token: CheckoutToken,
    /// When the record was last written, in epoch milliseconds.
    #[serde(rename = "t")]
    pub saved_at_ms: i64,
    /// Record schema version.
    #[serde(default = "default_record_version")]
    pub version: u32,
}

const fn default_record_version() -> u32 {
    TOKEN_RECORD_VERSION
}

impl TokenRecord {
    /// Create a record for `token` stamped with the current time.
    #[must_use]
    pub fn new(token: CheckoutToken) -> Self {
        Self {
            token,
            saved_at_ms: Utc::now().timestamp_millis(),
            version: TOKEN_RECORD_VERSION,
        }
    }

    /// The save timestamp as a [`DateTime`], if the stored value is in range.
    #[must_use]
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.saved_at_ms).single()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_tokens() {
        assert!(CheckoutToken::parse("chk_a1b2c3").is_ok());
        assert!(CheckoutToken::parse("x").is_ok());
        assert!(CheckoutToken::parse("token-with-dashes").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let token = CheckoutToken::parse("  chk_abc  ").unwrap();
        assert_eq!(token.as_str(), "chk_abc");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            CheckoutToken::parse(""),
            Err(CheckoutTokenError::Empty)
        ));
    }

    #[test]
    fn test_parse_whitespace_only() {
        assert!(matches!(
            CheckoutToken::parse("   \t\n"),
            Err(CheckoutTokenError::Empty)
        ));
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(
            CheckoutToken::from_raw(" abc ").map(|t| t.as_str().to_owned()),
            Some("abc".to_owned())
        );
        assert_eq!(CheckoutToken::from_raw("   "), None);
    }

    #[test]
    fn test_display() {
        let token = CheckoutToken::parse("chk_abc").unwrap();
        assert_eq!(format!("{token}"), "chk_abc");
    }

    #[test]
    fn test_serde_roundtrip() {
        let token = CheckoutToken::parse("chk_abc").unwrap();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"chk_abc\"");

        let parsed: CheckoutToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_serde_rejects_empty() {
        let result: Result<CheckoutToken, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let result: Result<CheckoutToken, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    #[test]
    fn test_record_wire_shape() {
        let record = TokenRecord {
            token: CheckoutToken::parse("chk_abc").unwrap(),
            saved_at_ms: 1_700_000_000_000,
            version: 1,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"token": "chk_abc", "t": 1_700_000_000_000_i64, "version": 1})
        );
    }

    #[test]
    fn test_record_version_defaults_on_read() {
        let record: TokenRecord =
            serde_json::from_str(r#"{"token": "chk_abc", "t": 1700000000000}"#).unwrap();
        assert_eq!(record.version, TOKEN_RECORD_VERSION);
    }

    #[test]
    fn test_record_rejects_empty_token() {
        let result: Result<TokenRecord, _> =
            serde_json::from_str(r#"{"token": "", "t": 1700000000000}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_new_stamps_now() {
        let before = Utc::now().timestamp_millis();
        let record = TokenRecord::new(CheckoutToken::parse("chk_abc").unwrap());
        let after = Utc::now().timestamp_millis();
        assert!(record.saved_at_ms >= before && record.saved_at_ms <= after);
        assert_eq!(record.version, TOKEN_RECORD_VERSION);
        assert!(record.saved_at().is_some());
    }
}
