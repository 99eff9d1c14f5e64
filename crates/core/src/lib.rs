//! RomanPie Core - Shared types library.
//!
//! This crate provides common types used across all RomanPie components:
//! - `session` - Checkout session manager library
//! - `cli` - Command-line tools for inspecting and refreshing session state
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Checkout tokens, token records, cart lines, and channels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
