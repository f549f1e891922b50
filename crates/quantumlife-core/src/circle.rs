//! Circles and the read-only Routing Config.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A circle's id. Human-chosen, unique within a `RoutingConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CircleId(pub String);

impl fmt::Display for CircleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CircleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A named attention domain owned by the user (Work, Family, Finance, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    /// Unique within the owning `RoutingConfig`.
    pub id: CircleId,
    /// Human-facing name.
    pub name: String,
    /// Mail accounts bound to this circle (lowercased addresses).
    pub mail_accounts: BTreeSet<String>,
    /// Calendar ids bound to this circle.
    pub calendar_ids: BTreeSet<String>,
    /// Finance accounts bound to this circle.
    pub finance_accounts: BTreeSet<String>,
}

impl Circle {
    /// Construct a circle with no integration bindings yet.
    pub fn new(id: impl Into<CircleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mail_accounts: BTreeSet::new(),
            calendar_ids: BTreeSet::new(),
            finance_accounts: BTreeSet::new(),
        }
    }
}

impl From<String> for CircleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Read-only routing configuration: circles, integration bindings, and the
/// domain/member/VIP sets the Router consults. All string comparisons are
/// case-folded before use — callers are expected to store already-lowercased
/// values, but the lookup helpers below lowercase defensively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    circles: Vec<Circle>,
    default_circle: CircleId,
    family_circle: Option<CircleId>,
    work_circle: Option<CircleId>,
    personal_circle: Option<CircleId>,
    work_domains: BTreeSet<String>,
    personal_domains: BTreeSet<String>,
    family_member_emails: BTreeSet<String>,
    vip_emails: BTreeSet<String>,
}

impl RoutingConfig {
    /// Build a routing config. `circles` must contain `default_circle`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        circles: Vec<Circle>,
        default_circle: CircleId,
        family_circle: Option<CircleId>,
        work_circle: Option<CircleId>,
        personal_circle: Option<CircleId>,
        work_domains: BTreeSet<String>,
        personal_domains: BTreeSet<String>,
        family_member_emails: BTreeSet<String>,
        vip_emails: BTreeSet<String>,
    ) -> Self {
        Self {
            circles,
            default_circle,
            family_circle,
            work_circle,
            personal_circle,
            work_domains: lower_set(work_domains),
            personal_domains: lower_set(personal_domains),
            family_member_emails: lower_set(family_member_emails),
            vip_emails: lower_set(vip_emails),
        }
    }

    /// All configured circles.
    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    /// The distinguished default circle.
    pub fn default_circle(&self) -> &CircleId {
        &self.default_circle
    }

    /// The family circle, if one is configured.
    pub fn family_circle(&self) -> Option<&CircleId> {
        self.family_circle.as_ref()
    }

    /// The work circle, if one is configured.
    pub fn work_circle(&self) -> Option<&CircleId> {
        self.work_circle.as_ref()
    }

    /// The personal circle, if one is configured.
    pub fn personal_circle(&self) -> Option<&CircleId> {
        self.personal_circle.as_ref()
    }

    /// The circle whose bound mail accounts contain `account` (case-folded).
    pub fn circle_for_mail_account(&self, account: &str) -> Option<&CircleId> {
        let account = account.to_lowercase();
        self.circles
            .iter()
            .find(|c| c.mail_accounts.contains(&account))
            .map(|c| &c.id)
    }

    /// The circle whose bound calendars contain `calendar_id`.
    pub fn circle_for_calendar_id(&self, calendar_id: &str) -> Option<&CircleId> {
        let calendar_id = calendar_id.to_lowercase();
        self.circles
            .iter()
            .find(|c| c.calendar_ids.contains(&calendar_id))
            .map(|c| &c.id)
    }

    /// Whether `domain` (case-folded) is a configured work domain.
    pub fn is_work_domain(&self, domain: &str) -> bool {
        self.work_domains.contains(&domain.to_lowercase())
    }

    /// Whether `domain` (case-folded) is a configured personal domain.
    pub fn is_personal_domain(&self, domain: &str) -> bool {
        self.personal_domains.contains(&domain.to_lowercase())
    }

    /// Whether `email` (case-folded) is in the configured family-member set.
    pub fn is_family_member_email(&self, email: &str) -> bool {
        self.family_member_emails.contains(&email.to_lowercase())
    }

    /// Whether `email` (case-folded) is in the configured VIP set.
    pub fn is_vip_email(&self, email: &str) -> bool {
        self.vip_emails.contains(&email.to_lowercase())
    }
}

fn lower_set(set: BTreeSet<String>) -> BTreeSet<String> {
    set.into_iter().map(|s| s.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RoutingConfig {
        let mut work = Circle::new("work", "Work");
        work.mail_accounts.insert("me@work.example".to_string());
        let default = Circle::new("inbox", "Inbox");
        RoutingConfig::new(
            vec![work, default],
            "inbox".into(),
            None,
            Some("work".into()),
            None,
            BTreeSet::from(["WORK.EXAMPLE".to_string()]),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
        )
    }

    #[test]
    fn domain_comparisons_are_case_folded() {
        let cfg = config();
        assert!(cfg.is_work_domain("work.example"));
        assert!(cfg.is_work_domain("Work.Example"));
    }

    #[test]
    fn mail_account_binding_resolves_to_circle() {
        let cfg = config();
        assert_eq!(
            cfg.circle_for_mail_account("ME@WORK.EXAMPLE"),
            Some(&CircleId::from("work"))
        );
        assert_eq!(cfg.circle_for_mail_account("nobody@x.com"), None);
    }
}
