//! External collaborator contracts consumed by the Router and its upstream
//! sources. No implementation lives in this repository — HTTP transport
//! adapters are out of scope here. These traits exist so the pipeline can
//! be exercised against test doubles without depending on a networking
//! stack.

use time::OffsetDateTime;

use crate::events::CanonicalEvent;

/// Read-only email access. Must never mutate remote state.
pub trait EmailAdapter: Send + Sync {
    /// Fetch messages for `account_id` occurring at or after `since`,
    /// newest-provider-order, capped at `limit`.
    fn fetch_messages(
        &self,
        account_id: &str,
        since: OffsetDateTime,
        limit: usize,
    ) -> Vec<CanonicalEvent>;

    /// Unread count for `account_id`, as reported by the provider.
    fn fetch_unread_count(&self, account_id: &str) -> u32;
}

/// Read-only calendar access.
pub trait CalendarAdapter: Send + Sync {
    /// Fetch events on `calendar_id` within `[from, to]`.
    fn fetch_events(
        &self,
        calendar_id: &str,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Vec<CanonicalEvent>;

    /// Count of events in the next `days` days.
    fn fetch_upcoming_count(&self, calendar_id: &str, days: u32) -> u32;
}

/// Read-only finance access.
pub trait FinanceAdapter: Send + Sync {
    /// Fetch transactions for `account_id` since `since`, capped at `limit`.
    fn fetch_transactions(
        &self,
        account_id: &str,
        since: OffsetDateTime,
        limit: usize,
    ) -> Vec<CanonicalEvent>;

    /// Current balance, in integer minor units.
    fn fetch_balance(&self, account_id: &str) -> i64;

    /// Count of pending transactions.
    fn fetch_pending_count(&self, account_id: &str) -> u32;
}

/// A person known to the identity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub u64);

/// An organization known to the identity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrgId(pub u64);

/// Optional capability consulted by the Router for person↔household and
/// person↔organization lookups. Its absence must degrade to config-only
/// routing with identical determinism.
pub trait IdentityGraph: Send + Sync {
    /// Resolve an email address to a known person.
    fn find_person_by_email(&self, email: &str) -> Option<PersonId>;

    /// Resolve a domain to a known organization.
    fn find_organization_by_domain(&self, domain: &str) -> Option<OrgId>;

    /// Whether `person` is a member of some household.
    fn is_household_member(&self, person: PersonId) -> bool;

    /// The organizations `person` is known to work for.
    fn get_person_organizations(&self, person: PersonId) -> Vec<OrgId>;

    /// The domain an organization is known by, for matching against
    /// `RoutingConfig`'s work-domain set (Router rule 4).
    fn organization_domain(&self, org: OrgId) -> Option<String>;
}
