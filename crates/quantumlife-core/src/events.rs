//! Canonical Events — the single ingestion-time representation every
//! adapter produces and every pipeline stage consumes.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::circle::CircleId;
use crate::ids::EventId;

const MAX_CONTENT_PREVIEW: usize = 500;

/// The four event kinds ingested by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Email,
    Calendar,
    Transaction,
    Balance,
}

impl EventKind {
    /// The string used as the `kind` component of the event id and in
    /// canonical strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Calendar => "calendar",
            Self::Transaction => "transaction",
            Self::Balance => "balance",
        }
    }
}

/// Kind-specific fields needed by the Router and Commerce Extractor. Every
/// other field (timestamps, vendor, preview) lives on `CanonicalEvent`
/// itself since it's common to all kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventDetail {
    Email {
        /// Sender address, as supplied by the adapter (not lowercased).
        sender: String,
        /// The mailbox that received the message — matched against a
        /// circle's bound mail accounts (Router rule 1).
        receiver_account: String,
        /// Truncated subject line, for the Commerce Extractor's quick filter.
        subject: String,
    },
    Calendar {
        /// The calendar id the event lives in — matched against a circle's
        /// bound calendars (Router rule 1).
        calendar_id: String,
        /// The organizer's address, if known.
        organizer: Option<String>,
        /// Attendee addresses.
        attendees: Vec<String>,
    },
    Transaction {
        /// The finance account id.
        account: String,
    },
    Balance {
        /// The finance account id.
        account: String,
    },
}

/// A single ingested, immutable fact about the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Stable id: `kind_<first16hex(sha256(kind:vendor:account:source_id))>`.
    pub id: EventId,
    pub kind: EventKind,
    /// The source vendor/provider (e.g. `"gmail"`, `"gcal"`, `"truelayer"`).
    pub vendor: String,
    /// The source id as assigned by the provider (message id, event id, ...).
    pub source_id: String,
    /// When the adapter observed this event.
    pub captured_at: OffsetDateTime,
    /// When the event actually happened, per the provider's own timestamp.
    pub occurred_at: OffsetDateTime,
    /// Assigned by the Router; `None` until routed.
    pub circle_id: Option<CircleId>,
    /// Truncated to `MAX_CONTENT_PREVIEW` chars at construction time.
    pub content_preview: String,
    pub detail: EventDetail,
}

impl CanonicalEvent {
    /// Construct a Canonical Event. `account` is the kind-specific key used
    /// in id derivation (mailbox for email, calendar id for calendar,
    /// finance account for transaction/balance).
    pub fn new(
        kind: EventKind,
        vendor: impl Into<String>,
        account: &str,
        source_id: impl Into<String>,
        captured_at: OffsetDateTime,
        occurred_at: OffsetDateTime,
        content_preview: impl Into<String>,
        detail: EventDetail,
    ) -> Self {
        let vendor = vendor.into();
        let source_id = source_id.into();
        let id = EventId::derive(kind.as_str(), &vendor, account, &source_id);
        let mut preview = content_preview.into();
        truncate_in_place(&mut preview, MAX_CONTENT_PREVIEW);
        Self {
            id,
            kind,
            vendor,
            source_id,
            captured_at,
            occurred_at,
            circle_id: None,
            content_preview: preview,
            detail,
        }
    }

    /// Assign a circle. Called exactly once, by the Router.
    pub fn with_circle(mut self, circle_id: CircleId) -> Self {
        self.circle_id = Some(circle_id);
        self
    }
}

fn truncate_in_place(s: &mut String, max_chars: usize) {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        *s = truncated;
    }
}
