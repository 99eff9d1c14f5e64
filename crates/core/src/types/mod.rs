//! Core types for RomanPie.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod channel;
pub mod token;

pub use cart::{CartLine, CartSnapshot};
pub use channel::{ChannelId, ChannelIdError};
pub use token::{CheckoutToken, CheckoutTokenError, TokenRecord, TOKEN_RECORD_VERSION};
