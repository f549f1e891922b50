//! Commerce Event and its supporting enums.

use std::collections::BTreeMap;

use time::OffsetDateTime;

/// What kind of commerce moment this email represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommerceEventType {
    Delivered,
    Refund,
    RideReceipt,
    SubscriptionRenewal,
    NewSubscription,
    Invoice,
    Shipment,
    PaymentReceipt,
    OrderPlaced,
}

impl CommerceEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Refund => "refund",
            Self::RideReceipt => "ride_receipt",
            Self::SubscriptionRenewal => "subscription_renewal",
            Self::NewSubscription => "new_subscription",
            Self::Invoice => "invoice",
            Self::Shipment => "shipment",
            Self::PaymentReceipt => "payment_receipt",
            Self::OrderPlaced => "order_placed",
        }
    }
}

/// Refinement of a `Shipment` event's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipmentStatus {
    OutForDelivery,
    InTransit,
    Dispatched,
    Failed,
    Unknown,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutForDelivery => "out_for_delivery",
            Self::InTransit => "in_transit",
            Self::Dispatched => "dispatched",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// A vendor category, derived from the vendor registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Retail,
    Groceries,
    RideShare,
    Streaming,
    Software,
    Travel,
    Utilities,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retail => "retail",
            Self::Groceries => "groceries",
            Self::RideShare => "ride_share",
            Self::Streaming => "streaming",
            Self::Software => "software",
            Self::Travel => "travel",
            Self::Utilities => "utilities",
            Self::Unknown => "unknown",
        }
    }
}

/// A classified, immutable commerce moment extracted from an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommerceEvent {
    /// The id of the source email this was extracted from.
    pub event_id: String,
    pub event_type_name: &'static str,
    pub vendor_canonical_name: String,
    pub category_name: &'static str,
    /// Integer minor units (e.g. cents), never a float.
    pub amount_minor: Option<i64>,
    /// ISO-4217 currency code, present iff `amount_minor` is.
    pub currency: Option<String>,
    pub order_id: Option<String>,
    pub tracking_id: Option<String>,
    pub shipment_status_name: Option<&'static str>,
    /// Bounded preview signals: truncated subject, sender address/domain,
    /// body snippet, raw amount/identifier matches. Never the full body.
    pub signals: BTreeMap<String, String>,
    pub occurred_at: OffsetDateTime,
}
