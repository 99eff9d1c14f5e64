//! Backend response-shape normalization.
//!
//! The webhook wraps a commerce backend whose responses arrive in one of
//! several nesting shapes: a flat token, a nested checkout object, or a
//! doubly-nested mutation result. Each field is located by walking a fixed
//! priority list of known paths; a field that no path resolves is simply
//! absent. Unknown shapes degrade to "no token / empty cart", never an error.

use serde_json::Value;

use romanpie_core::{CartLine, CheckoutToken};

use super::ResponseBody;

/// Known locations of the checkout object, in priority order.
const CHECKOUT_PATHS: &[&[&str]] = &[
    &["checkout"],
    &["data", "checkoutCreate", "checkout"],
    &["data", "checkout"],
];

/// Known locations of the token, in priority order.
const TOKEN_PATHS: &[&[&str]] = &[
    &["token"],
    &["checkout", "token"],
    &["data", "checkoutCreate", "checkout", "token"],
    &["data", "checkout", "token"],
];

/// The normalized view of a checkout-create or checkout-get response.
#[derive(Debug, Clone, Default)]
pub struct CheckoutPayload {
    /// The echoed or issued token, if any path resolved one.
    pub token: Option<CheckoutToken>,
    /// Whether any known path located a checkout object.
    pub checkout_present: bool,
    /// Normalized line items, empty when none were found.
    pub lines: Vec<CartLine>,
}

impl CheckoutPayload {
    /// A response counts as a live session when it echoes a token or yields
    /// any checkout object.
    #[must_use]
    pub const fn is_valid_session(&self) -> bool {
        self.token.is_some() || self.checkout_present
    }
}

/// Normalize a backend response body into a [`CheckoutPayload`].
///
/// Text bodies (anything that did not parse as JSON) normalize to the empty
/// payload.
#[must_use]
pub fn parse_checkout_payload(body: &ResponseBody) -> CheckoutPayload {
    let ResponseBody::Json(root) = body else {
        return CheckoutPayload::default();
    };

    let checkout = locate_first(root, CHECKOUT_PATHS).filter(|v| v.is_object());

    let token = locate_first(root, TOKEN_PATHS)
        .and_then(Value::as_str)
        .and_then(CheckoutToken::from_raw);

    let lines = checkout
        .and_then(|c| c.get("lines"))
        .or_else(|| root.get("lines"))
        .and_then(Value::as_array)
        .map(|entries| CartLine::normalize(entries))
        .unwrap_or_default();

    CheckoutPayload {
        token,
        checkout_present: checkout.is_some(),
        lines,
    }
}

/// Walk `paths` in order and return the first non-null value found.
fn locate_first<'a>(root: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| {
        let value = path.iter().try_fold(root, |v, key| v.get(key))?;
        (!value.is_null()).then_some(value)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> CheckoutPayload {
        parse_checkout_payload(&ResponseBody::Json(value))
    }

    #[test]
    fn test_flat_token() {
        let payload = parse(json!({"token": "abc"}));
        assert_eq!(payload.token.unwrap().as_str(), "abc");
        assert!(!payload.checkout_present);
        assert!(payload.lines.is_empty());
    }

    #[test]
    fn test_nested_checkout() {
        let payload = parse(json!({"checkout": {"token": "abc"}}));
        assert_eq!(payload.token.unwrap().as_str(), "abc");
        assert!(payload.checkout_present);
    }

    #[test]
    fn test_mutation_result_shape() {
        let payload = parse(json!({
            "data": {
                "checkoutCreate": {
                    "checkout": {
                        "token": "abc",
                        "lines": [{"variant": {"id": "v1"}, "quantity": 2}]
                    }
                }
            }
        }));
        assert_eq!(payload.token.unwrap().as_str(), "abc");
        assert!(payload.checkout_present);
        assert_eq!(
            payload.lines,
            vec![CartLine {
                variant_id: "v1".to_owned(),
                quantity: 2.0
            }]
        );
    }

    #[test]
    fn test_empty_object() {
        let payload = parse(json!({}));
        assert!(payload.token.is_none());
        assert!(!payload.checkout_present);
        assert!(payload.lines.is_empty());
        assert!(!payload.is_valid_session());
    }

    #[test]
    fn test_checkout_without_token_is_still_valid() {
        let payload = parse(json!({"checkout": {"id": "123"}}));
        assert!(payload.token.is_none());
        assert!(payload.checkout_present);
        assert!(payload.is_valid_session());
    }

    #[test]
    fn test_flat_token_takes_priority() {
        let payload = parse(json!({
            "token": "outer",
            "checkout": {"token": "inner"}
        }));
        assert_eq!(payload.token.unwrap().as_str(), "outer");
    }

    #[test]
    fn test_whitespace_token_is_absent() {
        let payload = parse(json!({"token": "   "}));
        assert!(payload.token.is_none());
    }

    #[test]
    fn test_null_checkout_falls_through() {
        let payload = parse(json!({
            "checkout": null,
            "data": {"checkout": {"token": "abc"}}
        }));
        assert!(payload.checkout_present);
        assert_eq!(payload.token.unwrap().as_str(), "abc");
    }

    #[test]
    fn test_root_lines_without_checkout() {
        let payload = parse(json!({
            "token": "abc",
            "lines": [{"variantId": "v1", "quantity": 1}]
        }));
        assert_eq!(payload.lines.len(), 1);
    }

    #[test]
    fn test_checkout_lines_win_over_root_lines() {
        let payload = parse(json!({
            "checkout": {"token": "abc", "lines": [{"variantId": "inner", "quantity": 1}]},
            "lines": [{"variantId": "outer", "quantity": 1}]
        }));
        assert_eq!(payload.lines.first().unwrap().variant_id, "inner");
    }

    #[test]
    fn test_text_body_is_empty_payload() {
        let payload = parse_checkout_payload(&ResponseBody::Text("OK".to_owned()));
        assert!(payload.token.is_none());
        assert!(!payload.checkout_present);
        assert!(payload.lines.is_empty());
    }

    #[test]
    fn test_non_object_json_is_empty_payload() {
        let payload = parse(json!(["not", "an", "object"]));
        assert!(payload.token.is_none());
        assert!(!payload.is_valid_session());
    }
}
