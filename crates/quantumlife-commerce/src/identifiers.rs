//! Order-id and tracking-id extraction.

use once_cell::sync::Lazy;
use regex::Regex;

const TRACKING_MIN_LEN: usize = 8;
const TRACKING_MAX_LEN: usize = 30;

static ORDER_ID_LABELED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)order\s*#?\s*[:#]?\s*([A-Z0-9][A-Z0-9-]{4,24})").unwrap());
static TRACKING_ID_LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)tracking\s*(?:number|id|#)?\s*[:#]?\s*([A-Z0-9]{8,30})").unwrap()
});
static BARE_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z0-9]{8,30}\b").unwrap());

/// Extract an order id: a labeled `order #...` / `order:` reference first.
pub fn extract_order_id(text: &str) -> Option<String> {
    ORDER_ID_LABELED
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract a tracking id: a labeled `tracking number/id/#` reference first,
/// falling back to a bare alphanumeric run of 8–30 characters.
pub fn extract_tracking_id(text: &str) -> Option<String> {
    if let Some(caps) = TRACKING_ID_LABELED.captures(text) {
        if let Some(m) = caps.get(1) {
            return Some(m.as_str().to_string());
        }
    }
    BARE_ALNUM_RUN
        .find(text)
        .map(|m| m.as_str().to_string())
        .filter(|s| s.len() >= TRACKING_MIN_LEN && s.len() <= TRACKING_MAX_LEN)
}
