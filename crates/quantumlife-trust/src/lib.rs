//! Trust Action Engine — permits exactly one reversible calendar-response
//! action per circle per day, bracketed by a 15-minute undo window.
//!
//! The engine never writes directly; it delegates to an injected
//! `CalendarExecutor` and only records the outcome.

#![forbid(unsafe_code)]

use time::{Duration, OffsetDateTime};

use quantumlife_core::circle::CircleId;
use quantumlife_core::clock::Clock;
use quantumlife_core::hashing::{canonical_string, full_hash};

const ACTION_KIND: &str = "calendar_respond";
const UNDO_WINDOW_MINUTES: i64 = 15;

/// A calendar response's current (and prior) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Tentative,
}

impl ResponseStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
        }
    }
}

/// An Approved calendar-response draft, ready for delegated execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarResponseDraft {
    pub draft_id: String,
    pub response: ResponseStatus,
    pub previous_response_status: ResponseStatus,
    pub envelope_hash: String,
}

impl CalendarResponseDraft {
    /// The inverse draft used by Undo: `response` and
    /// `previous_response_status` swap places.
    fn inverted(&self) -> Self {
        Self {
            draft_id: self.draft_id.clone(),
            response: self.previous_response_status,
            previous_response_status: self.response,
            envelope_hash: self.envelope_hash.clone(),
        }
    }
}

/// Delegated write path. The engine never opens its own.
pub trait CalendarExecutor: Send + Sync {
    fn respond(&self, draft: &CalendarResponseDraft) -> Result<(), ExecutionFailed>;
}

/// The executor declined or failed to apply the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionFailed;

/// Why eligibility, execute, or undo did not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustActionError {
    NoTrustBaseline,
    RealityViewNotAcknowledged,
    NoApprovedDraft,
    AlreadyExecutedThisPeriod,
    ExecutionFailed,
    ReceiptNotFound,
    NotExecuted,
    AlreadyUndone,
    UndoWindowExpired,
}

/// The single draft selected for execution, plus the context it ran in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustEligibility {
    pub draft: CalendarResponseDraft,
    pub circle_id: CircleId,
    pub period_key: String,
}

/// Run the four ordered eligibility checks and select the lexicographically
/// smallest draft id among qualifying drafts.
pub fn check_eligibility(
    circle_id: &CircleId,
    period_key: &str,
    trust_baseline_exists: bool,
    reality_view_acknowledged: bool,
    approved_drafts: &[CalendarResponseDraft],
    store: &dyn TrustActionStore,
) -> Result<TrustEligibility, TrustActionError> {
    if !trust_baseline_exists {
        return Err(TrustActionError::NoTrustBaseline);
    }
    if !reality_view_acknowledged {
        return Err(TrustActionError::RealityViewNotAcknowledged);
    }
    if approved_drafts.is_empty() {
        return Err(TrustActionError::NoApprovedDraft);
    }
    if store.has_executed_for_period(circle_id, period_key) {
        return Err(TrustActionError::AlreadyExecutedThisPeriod);
    }
    let mut sorted: Vec<CalendarResponseDraft> = approved_drafts.to_vec();
    sorted.sort_by(|a, b| a.draft_id.cmp(&b.draft_id));
    Ok(TrustEligibility {
        draft: sorted.into_iter().next().expect("non-empty checked above"),
        circle_id: circle_id.clone(),
        period_key: period_key.to_string(),
    })
}

/// State of a Trust Action Receipt. Moves monotonically Executed -> Undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustActionState {
    Executed,
    Undone,
}

/// Written on execute, mutated exactly once by a successful undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustActionReceipt {
    pub action_kind: &'static str,
    pub state: TrustActionState,
    pub undo_bucket: OffsetDateTime,
    pub period_key: String,
    pub circle_id_hash: String,
    pub draft_id_hash: String,
    pub envelope_hash: String,
    pub receipt_id: String,
    pub status_hash: String,
}

/// Per-(circle, period) execution tracking plus receipt/draft storage.
/// Execution history for a period is never cleared by Undo — a period
/// stays single-shot even after its one action is undone.
pub trait TrustActionStore: Send {
    fn put(&mut self, receipt: TrustActionReceipt, draft: CalendarResponseDraft);
    fn get_receipt(&self, receipt_id: &str) -> Option<&TrustActionReceipt>;
    fn get_draft(&self, receipt_id: &str) -> Option<&CalendarResponseDraft>;
    fn set_state(&mut self, receipt_id: &str, state: TrustActionState);
    fn has_executed_for_period(&self, circle_id: &CircleId, period_key: &str) -> bool;
}

/// Delegate execution of the selected draft, then record an Executed
/// receipt. `eligibility` must come from `check_eligibility` called against
/// the same store instance.
pub fn execute(
    eligibility: TrustEligibility,
    executor: &dyn CalendarExecutor,
    clock: &dyn Clock,
    store: &mut dyn TrustActionStore,
) -> Result<TrustActionReceipt, TrustActionError> {
    if store.has_executed_for_period(&eligibility.circle_id, &eligibility.period_key) {
        return Err(TrustActionError::AlreadyExecutedThisPeriod);
    }
    executor
        .respond(&eligibility.draft)
        .map_err(|_| TrustActionError::ExecutionFailed)?;

    let now = clock.now();
    let circle_id_hash = full_hash(eligibility.circle_id.to_string().as_bytes());
    let draft_id_hash = full_hash(eligibility.draft.draft_id.as_bytes());
    let envelope_hash = eligibility.draft.envelope_hash.clone();
    let state_str = "executed";

    let canonical = canonical_string(
        "TRUST_ACTION",
        "v1",
        &[
            ACTION_KIND,
            state_str,
            eligibility.period_key.as_str(),
            circle_id_hash.as_str(),
            draft_id_hash.as_str(),
            envelope_hash.as_str(),
        ],
    );
    let status_hash = full_hash(canonical.as_bytes());
    let receipt_id = status_hash[..16].to_string();

    let receipt = TrustActionReceipt {
        action_kind: ACTION_KIND,
        state: TrustActionState::Executed,
        undo_bucket: now + Duration::minutes(UNDO_WINDOW_MINUTES),
        period_key: eligibility.period_key.clone(),
        circle_id_hash,
        draft_id_hash,
        envelope_hash,
        receipt_id,
        status_hash,
    };

    store.put(receipt.clone(), eligibility.draft);
    Ok(receipt)
}

/// Locate the receipt, verify it's Executed and within its undo window,
/// delegate the inverse response, then mutate state to Undone.
pub fn undo(
    receipt_id: &str,
    executor: &dyn CalendarExecutor,
    clock: &dyn Clock,
    store: &mut dyn TrustActionStore,
) -> Result<TrustActionReceipt, TrustActionError> {
    let receipt = store
        .get_receipt(receipt_id)
        .cloned()
        .ok_or(TrustActionError::ReceiptNotFound)?;

    match receipt.state {
        TrustActionState::Undone => return Err(TrustActionError::AlreadyUndone),
        TrustActionState::Executed => {}
    }
    if clock.now() > receipt.undo_bucket {
        return Err(TrustActionError::UndoWindowExpired);
    }

    let draft = store
        .get_draft(receipt_id)
        .cloned()
        .ok_or(TrustActionError::ReceiptNotFound)?;
    let inverse_draft = draft.inverted();

    executor
        .respond(&inverse_draft)
        .map_err(|_| TrustActionError::ExecutionFailed)?;

    store.set_state(receipt_id, TrustActionState::Undone);
    let mut undone = receipt;
    undone.state = TrustActionState::Undone;
    Ok(undone)
}

/// In-memory `TrustActionStore`. A reference test double, not a persistence
/// layer.
#[derive(Debug, Default)]
pub struct InMemoryTrustActionStore {
    receipts: std::collections::BTreeMap<String, TrustActionReceipt>,
    drafts: std::collections::BTreeMap<String, CalendarResponseDraft>,
    executed_periods: std::collections::BTreeSet<(String, String)>,
}

impl InMemoryTrustActionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrustActionStore for InMemoryTrustActionStore {
    fn put(&mut self, receipt: TrustActionReceipt, draft: CalendarResponseDraft) {
        self.executed_periods
            .insert((receipt.circle_id_hash.clone(), receipt.period_key.clone()));
        self.drafts.insert(receipt.receipt_id.clone(), draft);
        self.receipts.insert(receipt.receipt_id.clone(), receipt);
    }

    fn get_receipt(&self, receipt_id: &str) -> Option<&TrustActionReceipt> {
        self.receipts.get(receipt_id)
    }

    fn get_draft(&self, receipt_id: &str) -> Option<&CalendarResponseDraft> {
        self.drafts.get(receipt_id)
    }

    fn set_state(&mut self, receipt_id: &str, state: TrustActionState) {
        if let Some(receipt) = self.receipts.get_mut(receipt_id) {
            receipt.state = state;
        }
    }

    fn has_executed_for_period(&self, circle_id: &CircleId, period_key: &str) -> bool {
        let circle_id_hash = full_hash(circle_id.to_string().as_bytes());
        self.executed_periods.contains(&(circle_id_hash, period_key.to_string()))
    }
}
