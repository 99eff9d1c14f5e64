//! Sales channel identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ChannelId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ChannelIdError {
    /// The input string is empty or contains only whitespace.
    #[error("channel identifier cannot be empty")]
    Empty,
}

/// A backend sales channel identifier.
///
/// Channels scope which catalog/pricing context a checkout is created under
/// (e.g. `default-channel`). Never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Parse a `ChannelId` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelIdError::Empty`] if the trimmed input is empty.
    pub fn parse(s: &str) -> Result<Self, ChannelIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ChannelIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the channel identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChannelId {
    type Err = ChannelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChannelId {
    type Error = ChannelIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ChannelId> for String {
    fn from(channel: ChannelId) -> Self {
        channel.0
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
