//! Cart line types.
//!
//! A [`CartLine`] is a read-through cache entry for one line of the remote
//! checkout's contents. Lines are derived from backend responses and replaced
//! wholesale; this component never mutates them independently.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One (variant, quantity) pair within a checkout's contents.
///
/// Serializes to the storage wire shape `{"variantId": .., "quantity": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product variant identifier, always non-empty after normalization.
    pub variant_id: String,
    /// Quantity of the variant, always `>= 0` after normalization.
    pub quantity: f64,
}

impl CartLine {
    /// Normalize one raw backend line entry into a `CartLine`.
    ///
    /// The variant identifier is taken from `variant.id` or `variantId`
    /// (numbers are coerced to strings) and the entry is dropped when neither
    /// yields a usable value. Quantities are coerced to non-negative numbers,
    /// with anything unparseable becoming `0`.
    #[must_use]
    pub fn from_raw(entry: &Value) -> Option<Self> {
        let variant_id = entry
            .get("variant")
            .and_then(|v| v.get("id"))
            .or_else(|| entry.get("variantId"))
            .and_then(coerce_variant_id)?;
        let quantity = coerce_quantity(entry.get("quantity"));
        Some(Self {
            variant_id,
            quantity,
        })
    }

    /// Normalize an arbitrary sequence of raw line entries, dropping entries
    /// without a usable variant identifier.
    #[must_use]
    pub fn normalize(entries: &[Value]) -> Vec<Self> {
        entries.iter().filter_map(Self::from_raw).collect()
    }

    /// Re-apply the line invariants to an already-built line.
    ///
    /// Trims the variant identifier and drops the line when it comes out
    /// empty; clamps the quantity to non-negative, with non-finite values
    /// becoming `0`. Lines built by [`from_raw`](Self::from_raw) pass through
    /// unchanged.
    #[must_use]
    pub fn into_normalized(self) -> Option<Self> {
        let variant_id = self.variant_id.trim().to_owned();
        if variant_id.is_empty() {
            return None;
        }
        let quantity = if self.quantity.is_finite() {
            self.quantity.max(0.0)
        } else {
            0.0
        };
        Some(Self {
            variant_id,
            quantity,
        })
    }
}

fn coerce_variant_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_quantity(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    parsed.max(0.0)
}

/// The persisted form of the cart cache.
///
/// Replaced wholesale on every successful validate/create response, never
/// merged incrementally. `t` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    /// Normalized cart lines, in backend order.
    pub lines: Vec<CartLine>,
    /// When the snapshot was written, in epoch milliseconds.
    #[serde(rename = "t")]
    pub saved_at_ms: i64,
}

impl CartSnapshot {
    /// Create a snapshot of `lines` stamped with the current time.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self {
            lines,
            saved_at_ms: Utc::now().timestamp_millis(),
        }
    }
}
