//! Order number normalization
//!
//! Customers type order numbers in many shapes (`10003`, `ord10003`,
//! `ORD-10003`, `ord 10003`). The backend expects the canonical
//! `ORD-<digits>` form, so anything recognizably an order number is
//! rewritten to it. Free text that does not look like an order number is
//! passed through exactly as typed.

use regex::Regex;
use std::sync::OnceLock;

/// Canonical order number prefix
pub const ORDER_PREFIX: &str = "ORD-";

fn bare_prefix_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ORD(\d+)$").expect("static regex is valid"))
}

fn digits_only() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("static regex is valid"))
}

/// Normalize an order number hint into `ORD-<digits>` form where possible.
///
/// # Examples
///
/// ```
/// use ecomdesk::chat::order_id::normalize_order_id;
///
/// assert_eq!(normalize_order_id("1234"), "ORD-1234");
/// assert_eq!(normalize_order_id("ord1234"), "ORD-1234");
/// assert_eq!(normalize_order_id("ORD-1234"), "ORD-1234");
/// assert_eq!(normalize_order_id("abc"), "abc");
/// ```
pub fn normalize_order_id(hint: &str) -> String {
    let compact: String = hint
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if compact.is_empty() {
        return hint.to_string();
    }
    if compact.starts_with(ORDER_PREFIX) {
        return compact;
    }
    if let Some(caps) = bare_prefix_digits().captures(&compact) {
        return format!("{}{}", ORDER_PREFIX, &caps[1]);
    }
    if digits_only().is_match(&compact) {
        return format!("{}{}", ORDER_PREFIX, compact);
    }
    hint.to_string()
}

/// Order number to send with a chat message.
///
/// Blank hints mean the customer gave no order number.
pub fn order_id_for_request(hint: Option<&str>) -> Option<String> {
    hint.filter(|h| !h.trim().is_empty())
        .map(normalize_order_id)
}
