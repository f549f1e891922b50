//! Quick filter and event-type classification.

use once_cell::sync::Lazy;
use regex::RegexSet;

use crate::types::{CommerceEventType, ShipmentStatus};

const QUICK_FILTER_KEYWORDS: &[&str] = &[
    "order",
    "receipt",
    "invoice",
    "payment",
    "delivery",
    "shipped",
    "tracking",
    "confirm",
    "purchase",
    "subscription",
    "renew",
    "refund",
    "trip",
    "ride",
    "bill",
];

const COMMERCE_DOMAIN_TOKENS: &[&str] = &[
    "order",
    "receipt",
    "invoice",
    "payment",
    "delivery",
    "shipping",
    "track",
    "confirm",
    "purchase",
    "subscribe",
    "renew",
    "billing",
    "shop",
    "store",
    "buy",
    "cart",
];

/// Step 1: accept an email as a commerce candidate if its text mentions a
/// quick-filter keyword, or its sender domain looks like a commerce domain.
pub fn passes_quick_filter(
    lower_subject_and_body: &str,
    sender_domain: &str,
    commerce_domain_registry_hit: bool,
) -> bool {
    if QUICK_FILTER_KEYWORDS
        .iter()
        .any(|kw| lower_subject_and_body.contains(kw))
    {
        return true;
    }
    if commerce_domain_registry_hit {
        return true;
    }
    let domain = sender_domain.to_lowercase();
    COMMERCE_DOMAIN_TOKENS.iter().any(|tok| domain.contains(tok))
}

// Classification families are ordered sets of regexes tried most-specific
// first; the first family with a hit wins. The fall-through order is a
// breaking-change surface and is preserved verbatim below.

static DELIVERED: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bdelivered\b",
        r"\bhas arrived\b",
        r"\bpackage (was )?delivered\b",
        r"\bdelivery complete\b",
    ])
    .unwrap()
});

static REFUND: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\brefund(ed)?\b",
        r"\bmoney back\b",
        r"\breturn(ed)? (and )?credit\b",
    ])
    .unwrap()
});

static RIDE_RECEIPT: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"\byour (trip|ride) (with|receipt)\b", r"\btrip receipt\b", r"\bride receipt\b"]).unwrap());

static SUBSCRIPTION_RENEWAL: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bsubscription (has )?renew(ed|al)?\b",
        r"\byour renewal\b",
        r"\bauto-renew(ed|al)?\b",
    ])
    .unwrap()
});

static NEW_SUBSCRIPTION: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bwelcome to\b.*\bsubscription\b",
        r"\bsubscription confirmed\b",
        r"\byou('ve| have) subscribed\b",
    ])
    .unwrap()
});

static INVOICE: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"\binvoice\b", r"\bbill(ing)? statement\b", r"\bamount due\b"]).unwrap());

static SHIPMENT: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bshipped\b",
        r"\bout for delivery\b",
        r"\bin transit\b",
        r"\btracking (number|info)\b",
        r"\bon its way\b",
    ])
    .unwrap()
});

static PAYMENT_RECEIPT: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([r"\bpayment receipt\b", r"\bpayment confirm(ed|ation)\b", r"\bpaid\b"]).unwrap()
});

static ORDER_PLACED: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\border confirm(ed|ation)\b",
        r"\bthanks for your order\b",
        r"\byour order\b",
    ])
    .unwrap()
});

fn families() -> Vec<(CommerceEventType, &'static Lazy<RegexSet>)> {
    vec![
        (CommerceEventType::Delivered, &DELIVERED),
        (CommerceEventType::Refund, &REFUND),
        (CommerceEventType::RideReceipt, &RIDE_RECEIPT),
        (CommerceEventType::SubscriptionRenewal, &SUBSCRIPTION_RENEWAL),
        (CommerceEventType::NewSubscription, &NEW_SUBSCRIPTION),
        (CommerceEventType::Invoice, &INVOICE),
        (CommerceEventType::Shipment, &SHIPMENT),
        (CommerceEventType::PaymentReceipt, &PAYMENT_RECEIPT),
        (CommerceEventType::OrderPlaced, &ORDER_PLACED),
    ]
}

/// Step 2: classify event type, most-specific family first. Returns `None`
/// if no family matches (the email is dropped upstream as
/// `dropped_missing_data`).
pub fn classify_event_type(lower_subject_and_body: &str) -> Option<CommerceEventType> {
    for (event_type, patterns) in families() {
        if patterns.is_match(lower_subject_and_body) {
            return Some(event_type);
        }
    }
    None
}

static OUT_FOR_DELIVERY: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"\bout for delivery\b", r"\barriving today\b"]).unwrap());
static IN_TRANSIT: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"\bin transit\b", r"\bon its way\b", r"\ben route\b"]).unwrap());
static DISPATCHED: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"\bdispatched\b", r"\bshipped\b", r"\bhas left the warehouse\b"]).unwrap());
static SHIPMENT_FAILED: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"\bdelivery (attempt )?failed\b", r"\bcould not (be )?deliver", r"\bundeliverable\b"]).unwrap());

/// Refine a `Shipment` event's status, most-specific first.
pub fn refine_shipment_status(lower_subject_and_body: &str) -> ShipmentStatus {
    if OUT_FOR_DELIVERY.is_match(lower_subject_and_body) {
        ShipmentStatus::OutForDelivery
    } else if IN_TRANSIT.is_match(lower_subject_and_body) {
        ShipmentStatus::InTransit
    } else if DISPATCHED.is_match(lower_subject_and_body) {
        ShipmentStatus::Dispatched
    } else if SHIPMENT_FAILED.is_match(lower_subject_and_body) {
        ShipmentStatus::Failed
    } else {
        ShipmentStatus::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_filter_accepts_keyword_hit() {
        assert!(passes_quick_filter("your order has shipped", "vendor.com", false));
    }

    #[test]
    fn quick_filter_accepts_commerce_domain_token() {
        assert!(passes_quick_filter("hello there", "shop.example.com", false));
    }

    #[test]
    fn quick_filter_rejects_unrelated_text() {
        assert!(!passes_quick_filter("let's catch up this weekend", "friend.example", false));
    }

    #[test]
    fn delivered_wins_over_shipment_when_both_present() {
        let text = "your package was shipped and has now delivered";
        assert_eq!(classify_event_type(text), Some(CommerceEventType::Delivered));
    }

    #[test]
    fn refund_classified_before_order_placed() {
        let text = "your order has been refunded";
        assert_eq!(classify_event_type(text), Some(CommerceEventType::Refund));
    }

    #[test]
    fn unmatched_text_returns_none() {
        assert_eq!(classify_event_type("just saying hi"), None);
    }

    #[test]
    fn shipment_status_prefers_out_for_delivery() {
        let text = "your package is out for delivery and in transit";
        assert_eq!(refine_shipment_status(text), ShipmentStatus::OutForDelivery);
    }

    #[test]
    fn shipment_status_defaults_to_unknown() {
        assert_eq!(refine_shipment_status("no status words here"), ShipmentStatus::Unknown);
    }
}
