//! Commerce Extractor — turns a `CanonicalEvent` email into a classified
//! `CommerceEvent`.
//!
//! Pure and deterministic: no I/O, no clock reads, no randomness. Steps run
//! in the fixed order quick-filter -> classify -> vendor -> amount ->
//! identifiers, mirroring the module layout below.

#![forbid(unsafe_code)]

mod amount;
mod classify;
mod identifiers;
mod types;
mod vendor;

pub use amount::Amount;
pub use types::{Category, CommerceEvent, CommerceEventType, ShipmentStatus};

use std::collections::BTreeMap;

use quantumlife_core::events::{CanonicalEvent, EventDetail, EventKind};

const SIGNAL_SUBJECT: &str = "subject";
const SIGNAL_SENDER: &str = "sender";
const SIGNAL_SENDER_DOMAIN: &str = "sender_domain";

/// Why an event did not become a `CommerceEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    NotEmail,
    FailedQuickFilter,
    Unclassified,
}

/// Running counters over an `extract_all` batch, surfaced for observability
/// rather than as per-event errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionMetrics {
    pub dropped_missing_data: u64,
    pub amounts_failed_parse: u64,
    pub unknown_vendor_count: u64,
}

/// Attempt to extract a single `CommerceEvent` from a `CanonicalEvent`.
/// Returns `None` if the event is not an email, fails the quick filter, or
/// classifies to no known commerce event type.
pub fn extract(event: &CanonicalEvent) -> Option<CommerceEvent> {
    let mut metrics = ExtractionMetrics::default();
    extract_inner(event, &mut metrics).ok()
}

/// Extract commerce events from a batch, in arrival order, then sort the
/// survivors by `(occurred_at, event_id)` for deterministic downstream
/// consumption.
pub fn extract_all(events: &[CanonicalEvent]) -> (Vec<CommerceEvent>, ExtractionMetrics) {
    let mut metrics = ExtractionMetrics::default();
    let mut out = Vec::new();
    for event in events {
        if let Ok(commerce_event) = extract_inner(event, &mut metrics) {
            out.push(commerce_event);
        }
    }
    out.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then_with(|| a.event_id.cmp(&b.event_id)));
    (out, metrics)
}

fn extract_inner(
    event: &CanonicalEvent,
    metrics: &mut ExtractionMetrics,
) -> Result<CommerceEvent, DropReason> {
    if event.kind != EventKind::Email {
        metrics.dropped_missing_data += 1;
        return Err(DropReason::NotEmail);
    }
    let EventDetail::Email {
        sender,
        receiver_account: _,
        subject,
    } = &event.detail
    else {
        metrics.dropped_missing_data += 1;
        return Err(DropReason::NotEmail);
    };

    let sender_domain = domain_of(sender);
    let combined = format!("{subject} {}", event.content_preview).to_lowercase();
    let domain_hit = vendor::is_commerce_domain(&sender_domain);

    if !classify::passes_quick_filter(&combined, &sender_domain, domain_hit) {
        metrics.dropped_missing_data += 1;
        return Err(DropReason::FailedQuickFilter);
    }

    let Some(event_type) = classify::classify_event_type(&combined) else {
        metrics.dropped_missing_data += 1;
        return Err(DropReason::Unclassified);
    };

    let shipment_status_name = matches!(event_type, CommerceEventType::Shipment)
        .then(|| classify::refine_shipment_status(&combined).as_str());

    let resolved_vendor = vendor::identify_vendor(&sender_domain, subject);
    if resolved_vendor.category == Category::Unknown {
        metrics.unknown_vendor_count += 1;
    }

    let (amount_minor, currency) = match amount::extract_amount(&combined) {
        Some((amt, cur)) => (Some(amt.minor_units), Some(cur.to_string())),
        None => {
            if looks_like_it_should_have_an_amount(event_type) {
                metrics.amounts_failed_parse += 1;
            }
            (None, None)
        }
    };

    let order_id = identifiers::extract_order_id(&combined);
    let tracking_id = identifiers::extract_tracking_id(&combined);

    let mut signals = BTreeMap::new();
    signals.insert(SIGNAL_SUBJECT.to_string(), truncate(subject, 120));
    signals.insert(SIGNAL_SENDER.to_string(), sender.clone());
    signals.insert(SIGNAL_SENDER_DOMAIN.to_string(), sender_domain);

    Ok(CommerceEvent {
        event_id: event.id.to_string(),
        event_type_name: event_type.as_str(),
        vendor_canonical_name: resolved_vendor.canonical_name,
        category_name: resolved_vendor.category.as_str(),
        amount_minor,
        currency,
        order_id,
        tracking_id,
        shipment_status_name,
        signals,
        occurred_at: event.occurred_at,
    })
}

fn looks_like_it_should_have_an_amount(event_type: CommerceEventType) -> bool {
    !matches!(
        event_type,
        CommerceEventType::Delivered | CommerceEventType::Shipment
    )
}

fn domain_of(email: &str) -> String {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .unwrap_or_default()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
