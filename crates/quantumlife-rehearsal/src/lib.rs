//! Delivery Rehearsal Engine — converts a permitted Interrupt Candidate
//! into at most one rehearsal push per circle per day.
//!
//! Six eligibility gates run in fixed order; the first failure ends in
//! `Rejected`. A passing candidate becomes a `Plan`, is handed to the
//! injected `PushTransport`, and always ends in a `RehearsalReceipt` — there
//! is no terminus that doesn't produce one.

#![forbid(unsafe_code)]

use quantumlife_core::circle::CircleId;
use quantumlife_core::clock::Clock;
use quantumlife_core::content_safety::validate_user_visible;
use quantumlife_core::hashing::{canonical_string, full_hash};
use quantumlife_core::ids::CandidateHash;

const RECEIPT_KIND: &str = "interrupt_push";
const PAYLOAD_TITLE: &str = "QuantumLife";
const PAYLOAD_BODY: &str = "Something needs you. Open QuantumLife.";
const PAYLOAD_DEEP_LINK: &str = "interrupts";

/// Daily cap on Delivered receipts per (circle, period), enforced by the
/// receipt store.
pub const DAILY_DELIVERED_CAP: usize = 2;

/// FIFO retention cap on the in-memory reference store.
const RETENTION_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Apns,
    Webhook,
    Stub,
    None,
}

impl TransportKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Apns => "apns",
            Self::Webhook => "webhook",
            Self::Stub => "stub",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RehearsalStatus {
    Requested,
    Rejected,
    Attempted,
    Delivered,
    Failed,
}

impl RehearsalStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Rejected => "rejected",
            Self::Attempted => "attempted",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    None,
    NoCandidate,
    PolicyDisallows,
    NoDevice,
    RateLimited,
    TransportUnavailable,
    SealedKeyMissing,
}

impl RejectReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NoCandidate => "reject_no_candidate",
            Self::PolicyDisallows => "reject_policy_disallows",
            Self::NoDevice => "reject_no_device",
            Self::RateLimited => "reject_rate_limited",
            Self::TransportUnavailable => "reject_transport_unavailable",
            Self::SealedKeyMissing => "reject_sealed_key_missing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryBucket {
    None,
    One,
}

impl DeliveryBucket {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::One => "one",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBucket {
    Fast,
    Ok,
    Slow,
    Na,
}

impl LatencyBucket {
    fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Ok => "ok",
            Self::Slow => "slow",
            Self::Na => "na",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Permanent,
    Unknown,
}

impl ErrorClass {
    fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::Unknown => "unknown",
        }
    }
}

/// What gets handed to the transport once all gates pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RehearsalPlan {
    pub circle_id: CircleId,
    pub candidate_hash: CandidateHash,
    pub attempt_id_hash: String,
    pub title: String,
    pub body: String,
    pub deep_link_target: String,
}

/// The transport's report on one attempt. Latency is supplied by the
/// transport, never measured by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered { latency: LatencyBucket },
    Failed { error_class: ErrorClass },
}

/// Injected delivery transport.
pub trait PushTransport: Send + Sync {
    fn send(&self, plan: &RehearsalPlan) -> PushOutcome;
}

/// Created at every terminus; never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RehearsalReceipt {
    pub kind: &'static str,
    pub status: RehearsalStatus,
    pub reject_reason: RejectReason,
    pub period_key: String,
    pub circle_id_hash: String,
    pub candidate_hash: Option<CandidateHash>,
    pub attempt_id_hash: Option<String>,
    pub transport: TransportKind,
    pub delivery_bucket: DeliveryBucket,
    pub latency_bucket: LatencyBucket,
    pub error_class: Option<ErrorClass>,
    pub status_hash: String,
}

/// Rejected once the receipt store's daily Delivered cap is exceeded; the
/// engine surfaces this as `reject_rate_limited`, never a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCapExceeded;

/// Append-only store enforcing the daily Delivered cap for (circle, period).
pub trait RehearsalReceiptStore: Send {
    fn append(&mut self, receipt: RehearsalReceipt) -> Result<(), DailyCapExceeded>;
    fn delivered_count(&self, circle_id: &CircleId, period_key: &str) -> usize;
}

/// Run the six eligibility gates in order, then (if eligible) attempt
/// delivery and persist the resulting receipt. Always returns a receipt.
#[allow(clippy::too_many_arguments)]
pub fn rehearse(
    candidate_hash: Option<&CandidateHash>,
    policy_allows: bool,
    device_present: bool,
    rate_limit_allows: bool,
    transport_kind: TransportKind,
    sealed_ready: bool,
    period_key: &str,
    circle_id: &CircleId,
    clock: &dyn Clock,
    transport: &dyn PushTransport,
    store: &mut dyn RehearsalReceiptStore,
) -> RehearsalReceipt {
    let circle_id_hash = full_hash(circle_id.to_string().as_bytes());
    let time_bucket = clock.time_bucket();

    let Some(candidate_hash) = candidate_hash else {
        return rejected(&circle_id_hash, period_key, None, RejectReason::NoCandidate, TransportKind::None, &time_bucket);
    };
    if !policy_allows {
        return rejected(
            &circle_id_hash,
            period_key,
            Some(candidate_hash.clone()),
            RejectReason::PolicyDisallows,
            TransportKind::None,
            &time_bucket,
        );
    }
    if !device_present {
        return rejected(
            &circle_id_hash,
            period_key,
            Some(candidate_hash.clone()),
            RejectReason::NoDevice,
            TransportKind::None,
            &time_bucket,
        );
    }
    if !rate_limit_allows {
        return rejected(
            &circle_id_hash,
            period_key,
            Some(candidate_hash.clone()),
            RejectReason::RateLimited,
            TransportKind::None,
            &time_bucket,
        );
    }
    if transport_kind == TransportKind::None {
        return rejected(
            &circle_id_hash,
            period_key,
            Some(candidate_hash.clone()),
            RejectReason::TransportUnavailable,
            TransportKind::None,
            &time_bucket,
        );
    }
    if transport_kind == TransportKind::Apns && !sealed_ready {
        return rejected(
            &circle_id_hash,
            period_key,
            Some(candidate_hash.clone()),
            RejectReason::SealedKeyMissing,
            transport_kind,
            &time_bucket,
        );
    }

    let attempt_id_hash = compute_attempt_id_hash(&circle_id_hash, candidate_hash, period_key);
    let plan = RehearsalPlan {
        circle_id: circle_id.clone(),
        candidate_hash: candidate_hash.clone(),
        attempt_id_hash: attempt_id_hash.clone(),
        title: PAYLOAD_TITLE.to_string(),
        body: PAYLOAD_BODY.to_string(),
        deep_link_target: PAYLOAD_DEEP_LINK.to_string(),
    };
    validate_user_visible(&plan.title).expect("constant payload title always passes content safety");
    validate_user_visible(&plan.body).expect("constant payload body always passes content safety");

    let outcome = transport.send(&plan);
    let receipt = match outcome {
        PushOutcome::Delivered { latency } => {
            let status_hash = compute_status_hash(
                RehearsalStatus::Delivered,
                RejectReason::None,
                period_key,
                &circle_id_hash,
                Some(candidate_hash),
                Some(attempt_id_hash.as_str()),
                transport_kind,
                DeliveryBucket::One,
                latency,
                None,
                &time_bucket,
            );
            RehearsalReceipt {
                kind: RECEIPT_KIND,
                status: RehearsalStatus::Delivered,
                reject_reason: RejectReason::None,
                period_key: period_key.to_string(),
                circle_id_hash: circle_id_hash.clone(),
                candidate_hash: Some(candidate_hash.clone()),
                attempt_id_hash: Some(attempt_id_hash),
                transport: transport_kind,
                delivery_bucket: DeliveryBucket::One,
                latency_bucket: latency,
                error_class: None,
                status_hash,
            }
        }
        PushOutcome::Failed { error_class } => {
            let status_hash = compute_status_hash(
                RehearsalStatus::Failed,
                RejectReason::None,
                period_key,
                &circle_id_hash,
                Some(candidate_hash),
                Some(attempt_id_hash.as_str()),
                transport_kind,
                DeliveryBucket::None,
                LatencyBucket::Na,
                Some(error_class),
                &time_bucket,
            );
            RehearsalReceipt {
                kind: RECEIPT_KIND,
                status: RehearsalStatus::Failed,
                reject_reason: RejectReason::None,
                period_key: period_key.to_string(),
                circle_id_hash: circle_id_hash.clone(),
                candidate_hash: Some(candidate_hash.clone()),
                attempt_id_hash: Some(attempt_id_hash),
                transport: transport_kind,
                delivery_bucket: DeliveryBucket::None,
                latency_bucket: LatencyBucket::Na,
                error_class: Some(error_class),
                status_hash,
            }
        }
    };

    match store.append(receipt.clone()) {
        Ok(()) => receipt,
        Err(DailyCapExceeded) => {
            let rejected_receipt = rejected(
                &circle_id_hash,
                period_key,
                Some(candidate_hash.clone()),
                RejectReason::RateLimited,
                transport_kind,
                &time_bucket,
            );
            let _ = store.append(rejected_receipt.clone());
            rejected_receipt
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn rejected(
    circle_id_hash: &str,
    period_key: &str,
    candidate_hash: Option<CandidateHash>,
    reason: RejectReason,
    transport: TransportKind,
    time_bucket: &str,
) -> RehearsalReceipt {
    let status_hash = compute_status_hash(
        RehearsalStatus::Rejected,
        reason,
        period_key,
        circle_id_hash,
        candidate_hash.as_ref(),
        None,
        transport,
        DeliveryBucket::None,
        LatencyBucket::Na,
        None,
        time_bucket,
    );
    RehearsalReceipt {
        kind: RECEIPT_KIND,
        status: RehearsalStatus::Rejected,
        reject_reason: reason,
        period_key: period_key.to_string(),
        circle_id_hash: circle_id_hash.to_string(),
        candidate_hash,
        attempt_id_hash: None,
        transport,
        delivery_bucket: DeliveryBucket::None,
        latency_bucket: LatencyBucket::Na,
        error_class: None,
        status_hash,
    }
}

fn compute_attempt_id_hash(circle_id_hash: &str, candidate_hash: &CandidateHash, period_key: &str) -> String {
    let canonical = canonical_string(
        "REHEARSAL_ATTEMPT_DEDUP",
        "v1",
        &[circle_id_hash, candidate_hash.to_string().as_str(), period_key],
    );
    full_hash(canonical.as_bytes())[..16].to_string()
}

/// Bit-exact `REHEARSAL_RECEIPT` canonical string, truncated to the
/// first 16 hex chars of its SHA-256 — mirrors the status-hash shape
/// used by the Trust and Interrupt receipts.
#[allow(clippy::too_many_arguments)]
fn compute_status_hash(
    status: RehearsalStatus,
    reject_reason: RejectReason,
    period_key: &str,
    circle_id_hash: &str,
    candidate_hash: Option<&CandidateHash>,
    attempt_id_hash: Option<&str>,
    transport: TransportKind,
    delivery_bucket: DeliveryBucket,
    latency_bucket: LatencyBucket,
    error_class: Option<ErrorClass>,
    time_bucket: &str,
) -> String {
    let candidate_hash_str = candidate_hash.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string());
    let canonical = canonical_string(
        "REHEARSAL_RECEIPT",
        "v1",
        &[
            RECEIPT_KIND,
            status.as_str(),
            reject_reason.as_str(),
            period_key,
            circle_id_hash,
            candidate_hash_str.as_str(),
            attempt_id_hash.unwrap_or("none"),
            transport.as_str(),
            delivery_bucket.as_str(),
            latency_bucket.as_str(),
            error_class.map(ErrorClass::as_str).unwrap_or("none"),
            time_bucket,
        ],
    );
    full_hash(canonical.as_bytes())[..16].to_string()
}

/// In-memory `RehearsalReceiptStore`: FIFO-capped at `RETENTION_CAP`,
/// enforcing `DAILY_DELIVERED_CAP` Delivered receipts per (circle, period).
/// A reference test double, not a persistence layer.
#[derive(Debug, Default)]
pub struct InMemoryRehearsalReceiptStore {
    records: std::collections::VecDeque<RehearsalReceipt>,
}

impl InMemoryRehearsalReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RehearsalReceiptStore for InMemoryRehearsalReceiptStore {
    fn append(&mut self, receipt: RehearsalReceipt) -> Result<(), DailyCapExceeded> {
        if receipt.status == RehearsalStatus::Delivered {
            let circle_id_hash = receipt.circle_id_hash.clone();
            let period_key = receipt.period_key.clone();
            let existing = self
                .records
                .iter()
                .filter(|r| {
                    r.status == RehearsalStatus::Delivered
                        && r.circle_id_hash == circle_id_hash
                        && r.period_key == period_key
                })
                .count();
            if existing >= DAILY_DELIVERED_CAP {
                return Err(DailyCapExceeded);
            }
        }
        if self.records.len() >= RETENTION_CAP {
            self.records.pop_front();
        }
        self.records.push_back(receipt);
        Ok(())
    }

    fn delivered_count(&self, circle_id: &CircleId, period_key: &str) -> usize {
        let circle_id_hash = full_hash(circle_id.to_string().as_bytes());
        self.records
            .iter()
            .filter(|r| {
                r.status == RehearsalStatus::Delivered
                    && r.circle_id_hash == circle_id_hash
                    && r.period_key == period_key
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantumlife_core::clock::FixedClock;

    struct AlwaysDelivers;
    impl PushTransport for AlwaysDelivers {
        fn send(&self, _plan: &RehearsalPlan) -> PushOutcome {
            PushOutcome::Delivered { latency: LatencyBucket::Fast }
        }
    }

    struct AlwaysFails;
    impl PushTransport for AlwaysFails {
        fn send(&self, _plan: &RehearsalPlan) -> PushOutcome {
            PushOutcome::Failed { error_class: ErrorClass::Transient }
        }
    }

    fn circle() -> CircleId {
        CircleId::from("work")
    }

    #[test]
    fn no_candidate_rejects_first() {
        let mut store = InMemoryRehearsalReceiptStore::new();
        let receipt = rehearse(
            None,
            true,
            true,
            true,
            TransportKind::Stub,
            false,
            "2026-01-01",
            &circle(),
            &FixedClock::from_unix(1_735_689_600),
            &AlwaysDelivers,
            &mut store,
        );
        assert_eq!(receipt.status, RehearsalStatus::Rejected);
        assert_eq!(receipt.reject_reason, RejectReason::NoCandidate);
    }

    #[test]
    fn apns_without_sealed_credentials_rejects() {
        let mut store = InMemoryRehearsalReceiptStore::new();
        let candidate = CandidateHash::from("c1");
        let receipt = rehearse(
            Some(&candidate),
            true,
            true,
            true,
            TransportKind::Apns,
            false,
            "2026-01-01",
            &circle(),
            &FixedClock::from_unix(1_735_689_600),
            &AlwaysDelivers,
            &mut store,
        );
        assert_eq!(receipt.reject_reason, RejectReason::SealedKeyMissing);
    }

    #[test]
    fn successful_delivery_persists_delivered_receipt() {
        let mut store = InMemoryRehearsalReceiptStore::new();
        let candidate = CandidateHash::from("c1");
        let receipt = rehearse(
            Some(&candidate),
            true,
            true,
            true,
            TransportKind::Stub,
            false,
            "2026-01-01",
            &circle(),
            &FixedClock::from_unix(1_735_689_600),
            &AlwaysDelivers,
            &mut store,
        );
        assert_eq!(receipt.status, RehearsalStatus::Delivered);
        assert_eq!(store.delivered_count(&circle(), "2026-01-01"), 1);
    }

    #[test]
    fn failed_transport_does_not_count_toward_daily_cap() {
        let mut store = InMemoryRehearsalReceiptStore::new();
        let candidate = CandidateHash::from("c1");
        let receipt = rehearse(
            Some(&candidate),
            true,
            true,
            true,
            TransportKind::Stub,
            false,
            "2026-01-01",
            &circle(),
            &FixedClock::from_unix(1_735_689_600),
            &AlwaysFails,
            &mut store,
        );
        assert_eq!(receipt.status, RehearsalStatus::Failed);
        assert_eq!(store.delivered_count(&circle(), "2026-01-01"), 0);
    }

    #[test]
    fn third_delivery_in_a_period_is_rate_limited_by_the_store() {
        let mut store = InMemoryRehearsalReceiptStore::new();
        let candidate = CandidateHash::from("c1");
        for _ in 0..2 {
            let receipt = rehearse(
                Some(&candidate),
                true,
                true,
                true,
                TransportKind::Stub,
                false,
                "2026-01-01",
                &circle(),
                &FixedClock::from_unix(1_735_689_600),
                &AlwaysDelivers,
                &mut store,
            );
            assert_eq!(receipt.status, RehearsalStatus::Delivered);
        }
        let third = rehearse(
            Some(&candidate),
            true,
            true,
            true,
            TransportKind::Stub,
            false,
            "2026-01-01",
            &circle(),
            &FixedClock::from_unix(1_735_689_600),
            &AlwaysDelivers,
            &mut store,
        );
        assert_eq!(third.status, RehearsalStatus::Rejected);
        assert_eq!(third.reject_reason, RejectReason::RateLimited);
    }

    #[test]
    fn attempt_id_hash_is_deterministic() {
        let circle_id_hash = full_hash(b"work");
        let candidate = CandidateHash::from("c1");
        let a = compute_attempt_id_hash(&circle_id_hash, &candidate, "2026-01-01");
        let b = compute_attempt_id_hash(&circle_id_hash, &candidate, "2026-01-01");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn status_hash_is_deterministic_and_present_on_every_receipt() {
        let mut store = InMemoryRehearsalReceiptStore::new();
        let candidate = CandidateHash::from("c1");
        let clock = FixedClock::from_unix(1_735_689_600);
        let first = rehearse(
            Some(&candidate),
            true,
            true,
            true,
            TransportKind::Stub,
            false,
            "2026-01-01",
            &circle(),
            &clock,
            &AlwaysDelivers,
            &mut store,
        );
        assert_eq!(first.status_hash.len(), 16);

        let mut other_store = InMemoryRehearsalReceiptStore::new();
        let second = rehearse(
            Some(&candidate),
            true,
            true,
            true,
            TransportKind::Stub,
            false,
            "2026-01-01",
            &circle(),
            &clock,
            &AlwaysDelivers,
            &mut other_store,
        );
        assert_eq!(first.status_hash, second.status_hash);

        let rejected = rehearse(
            None,
            true,
            true,
            true,
            TransportKind::Stub,
            false,
            "2026-01-01",
            &circle(),
            &clock,
            &AlwaysDelivers,
            &mut InMemoryRehearsalReceiptStore::new(),
        );
        assert_eq!(rejected.status_hash.len(), 16);
        assert_ne!(rejected.status_hash, first.status_hash);
    }
}
