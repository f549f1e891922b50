//! View Snapshotter — a bounded, per-circle summary of "what needs you"
//! with a stable content hash.
//!
//! Pure: every count is supplied by the caller via `ViewInputs`, never
//! fetched here. The six counts are computed and hashed in one fixed order;
//! reordering them changes every snapshot's `content_hash`.

#![forbid(unsafe_code)]

use quantumlife_core::circle::CircleId;
use quantumlife_core::clock::Clock;
use quantumlife_core::hashing::canonical_string;

/// Counts an embedding host gathers (via its adapters) before calling
/// `snapshot`. Each field is already scoped to one circle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewInputs {
    pub unread_mail_count: u32,
    pub important_mail_count: u32,
    pub upcoming_calendar_count: u32,
    pub today_calendar_count: u32,
    pub pending_transaction_count: u32,
    pub new_transaction_count: u32,
    /// Current balance across the circle's finance accounts, minor units.
    pub balance_minor: i64,
}

/// A bounded summary for one circle in one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub circle_id: CircleId,
    pub period_key: String,
    pub unread_mail_count: u32,
    pub important_mail_count: u32,
    pub upcoming_calendar_count: u32,
    pub today_calendar_count: u32,
    pub pending_transaction_count: u32,
    pub new_transaction_count: u32,
    pub balance_minor: i64,
    pub nothing_needs_you: bool,
    pub content_hash: String,
}

const CANONICAL_TAG: &str = "VIEW_SNAPSHOT";
const CANONICAL_VERSION: &str = "v1";

/// Compute a `ViewSnapshot` for one circle in the clock's current period.
///
/// The six counts are summed, in the fixed order they're declared on
/// `ViewInputs`, to decide `nothing_needs_you`; the same fixed order feeds
/// the canonical string that `content_hash` is derived from.
pub fn snapshot(circle_id: &CircleId, inputs: &ViewInputs, clock: &dyn Clock) -> ViewSnapshot {
    let period_key = clock.period_key();

    let total = u64::from(inputs.unread_mail_count)
        + u64::from(inputs.important_mail_count)
        + u64::from(inputs.upcoming_calendar_count)
        + u64::from(inputs.today_calendar_count)
        + u64::from(inputs.pending_transaction_count)
        + u64::from(inputs.new_transaction_count);
    let nothing_needs_you = total == 0;

    let circle_id_str = circle_id.to_string();
    let unread = inputs.unread_mail_count.to_string();
    let important = inputs.important_mail_count.to_string();
    let upcoming = inputs.upcoming_calendar_count.to_string();
    let today = inputs.today_calendar_count.to_string();
    let pending = inputs.pending_transaction_count.to_string();
    let new_txn = inputs.new_transaction_count.to_string();
    let balance = inputs.balance_minor.to_string();

    let canonical = canonical_string(
        CANONICAL_TAG,
        CANONICAL_VERSION,
        &[
            circle_id_str.as_str(),
            period_key.as_str(),
            unread.as_str(),
            important.as_str(),
            upcoming.as_str(),
            today.as_str(),
            pending.as_str(),
            new_txn.as_str(),
            balance.as_str(),
        ],
    );
    let content_hash = quantumlife_core::hashing::full_hash(canonical.as_bytes());

    ViewSnapshot {
        circle_id: circle_id.clone(),
        period_key,
        unread_mail_count: inputs.unread_mail_count,
        important_mail_count: inputs.important_mail_count,
        upcoming_calendar_count: inputs.upcoming_calendar_count,
        today_calendar_count: inputs.today_calendar_count,
        pending_transaction_count: inputs.pending_transaction_count,
        new_transaction_count: inputs.new_transaction_count,
        balance_minor: inputs.balance_minor,
        nothing_needs_you,
        content_hash,
    }
}

/// Last-writer-wins store keyed by `(circle, period)`, matching the
/// retention rule for view snapshots. An in-memory reference implementation
/// only — not a persistence layer.
pub trait ViewSnapshotStore: Send {
    /// Overwrite any existing snapshot for `(circle, period)`.
    fn put(&mut self, snapshot: ViewSnapshot);
    /// The most recently stored snapshot for `(circle, period)`, if any.
    fn get(&self, circle_id: &CircleId, period_key: &str) -> Option<&ViewSnapshot>;
}

/// In-memory `ViewSnapshotStore`, last-writer-wins by `(circle, period)`.
#[derive(Debug, Default)]
pub struct InMemoryViewSnapshotStore {
    by_key: std::collections::BTreeMap<(String, String), ViewSnapshot>,
}

impl InMemoryViewSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewSnapshotStore for InMemoryViewSnapshotStore {
    fn put(&mut self, snapshot: ViewSnapshot) {
        let key = (snapshot.circle_id.to_string(), snapshot.period_key.clone());
        self.by_key.insert(key, snapshot);
    }

    fn get(&self, circle_id: &CircleId, period_key: &str) -> Option<&ViewSnapshot> {
        self.by_key.get(&(circle_id.to_string(), period_key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantumlife_core::clock::FixedClock;

    fn circle() -> CircleId {
        CircleId::from("work")
    }

    #[test]
    fn nothing_needs_you_when_all_counts_zero() {
        let clock = FixedClock::from_unix(1_700_000_000);
        let snap = snapshot(&circle(), &ViewInputs::default(), &clock);
        assert!(snap.nothing_needs_you);
    }

    #[test]
    fn any_nonzero_count_clears_nothing_needs_you() {
        let clock = FixedClock::from_unix(1_700_000_000);
        let inputs = ViewInputs {
            unread_mail_count: 1,
            ..ViewInputs::default()
        };
        let snap = snapshot(&circle(), &inputs, &clock);
        assert!(!snap.nothing_needs_you);
    }

    #[test]
    fn repeated_runs_over_same_inputs_hash_identically() {
        let clock = FixedClock::from_unix(1_700_000_000);
        let inputs = ViewInputs {
            unread_mail_count: 3,
            important_mail_count: 1,
            upcoming_calendar_count: 2,
            today_calendar_count: 0,
            pending_transaction_count: 1,
            new_transaction_count: 0,
            balance_minor: 12_345,
        };
        let a = snapshot(&circle(), &inputs, &clock);
        let b = snapshot(&circle(), &inputs, &clock);
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn different_circle_id_changes_hash() {
        let clock = FixedClock::from_unix(1_700_000_000);
        let inputs = ViewInputs {
            unread_mail_count: 2,
            ..ViewInputs::default()
        };
        let a = snapshot(&CircleId::from("work"), &inputs, &clock);
        let b = snapshot(&CircleId::from("family"), &inputs, &clock);
        assert_ne!(a.content_hash, b.content_hash);
    }

    #[test]
    fn store_is_last_writer_wins_per_circle_and_period() {
        let clock = FixedClock::from_unix(1_700_000_000);
        let mut store = InMemoryViewSnapshotStore::new();
        let first = snapshot(&circle(), &ViewInputs::default(), &clock);
        let period_key = first.period_key.clone();
        store.put(first);

        let updated = snapshot(
            &circle(),
            &ViewInputs {
                unread_mail_count: 5,
                ..ViewInputs::default()
            },
            &clock,
        );
        store.put(updated);

        let latest = store.get(&circle(), &period_key).unwrap();
        assert_eq!(latest.unread_mail_count, 5);
    }
}
