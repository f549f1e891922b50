//! # Deterministic Router
//!
//! Assigns each Canonical Event to exactly one circle by strict priority,
//! without ML, without randomness, without clock reads. Pure function of
//! `(event, routing config, identity graph snapshot)`; cannot fail, and is
//! fully deterministic across repeated calls: ordered rules, first match
//! wins, ties broken by rule order then by a stable secondary key.

#![forbid(unsafe_code)]

use quantumlife_core::adapters::IdentityGraph;
use quantumlife_core::circle::{CircleId, RoutingConfig};
use quantumlife_core::events::{CanonicalEvent, EventDetail, EventKind};

/// Why a circle was chosen. One variant per precedence rule, covering all
/// seven email/calendar rules plus the finance/default fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingReason {
    /// Rule 1: receiver/calendar binding.
    P1,
    /// Rule 2: household membership via identity graph.
    P2,
    /// Rule 3: configured family-member set.
    P3,
    /// Rule 4: organization domain via identity graph.
    P4,
    /// Rule 5: sender/organizer domain in work-domains.
    P5,
    /// Rule 6: sender/organizer domain in personal-domains.
    P6,
    /// Rule 7: default circle.
    P7,
}

/// The outcome of routing a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub circle_id: CircleId,
    pub reason: RoutingReason,
}

/// Route a Canonical Event to a circle. Cannot fail: an event with no
/// matching rule lands in the default circle (`P7`).
pub fn route(
    event: &CanonicalEvent,
    config: &RoutingConfig,
    identity: Option<&dyn IdentityGraph>,
) -> RoutingDecision {
    match event.kind {
        EventKind::Email => route_email(event, config, identity),
        EventKind::Calendar => route_calendar(event, config, identity),
        EventKind::Transaction | EventKind::Balance => route_finance(event, config),
    }
}

fn route_email(
    event: &CanonicalEvent,
    config: &RoutingConfig,
    identity: Option<&dyn IdentityGraph>,
) -> RoutingDecision {
    let EventDetail::Email {
        sender,
        receiver_account,
        ..
    } = &event.detail
    else {
        return default_decision(config);
    };

    // Rule 1: receiver address is bound to a circle's mail account.
    if let Some(circle_id) = config.circle_for_mail_account(receiver_account) {
        return RoutingDecision {
            circle_id: circle_id.clone(),
            reason: RoutingReason::P1,
        };
    }

    if let Some(graph) = identity {
        if let Some(person) = graph.find_person_by_email(sender) {
            // Rule 2: sender is a household member.
            if graph.is_household_member(person) {
                if let Some(family) = config.family_circle() {
                    return RoutingDecision {
                        circle_id: family.clone(),
                        reason: RoutingReason::P2,
                    };
                }
            }
        }
    }

    // Rule 3: sender matches the configured family-member set.
    if config.is_family_member_email(sender) {
        if let Some(family) = config.family_circle() {
            return RoutingDecision {
                circle_id: family.clone(),
                reason: RoutingReason::P3,
            };
        }
    }

    if let Some(graph) = identity {
        if let Some(person) = graph.find_person_by_email(sender) {
            // Rule 4: sender is employed by an org whose domain is a work domain.
            for org in graph.get_person_organizations(person) {
                if let Some(domain) = graph.organization_domain(org) {
                    if config.is_work_domain(&domain) {
                        if let Some(work) = config.work_circle() {
                            return RoutingDecision {
                                circle_id: work.clone(),
                                reason: RoutingReason::P4,
                            };
                        }
                    }
                }
            }
        }
    }

    let domain = domain_of(sender);

    // Rule 5: sender domain is a work domain.
    if config.is_work_domain(&domain) {
        if let Some(work) = config.work_circle() {
            return RoutingDecision {
                circle_id: work.clone(),
                reason: RoutingReason::P5,
            };
        }
    }

    // Rule 6: sender domain is a personal domain.
    if config.is_personal_domain(&domain) {
        if let Some(personal) = config.personal_circle() {
            return RoutingDecision {
                circle_id: personal.clone(),
                reason: RoutingReason::P6,
            };
        }
    }

    // Rule 7: default circle.
    default_decision(config)
}

fn route_calendar(
    event: &CanonicalEvent,
    config: &RoutingConfig,
    identity: Option<&dyn IdentityGraph>,
) -> RoutingDecision {
    let EventDetail::Calendar {
        calendar_id,
        organizer,
        attendees,
    } = &event.detail
    else {
        return default_decision(config);
    };

    // Rule 1: calendar id is bound to a circle.
    if let Some(circle_id) = config.circle_for_calendar_id(calendar_id) {
        return RoutingDecision {
            circle_id: circle_id.clone(),
            reason: RoutingReason::P1,
        };
    }

    if let (Some(graph), Some(organizer)) = (identity, organizer.as_deref()) {
        if let Some(person) = graph.find_person_by_email(organizer) {
            // Rule 2: organizer is a household member.
            if graph.is_household_member(person) {
                if let Some(family) = config.family_circle() {
                    return RoutingDecision {
                        circle_id: family.clone(),
                        reason: RoutingReason::P2,
                    };
                }
            }
        }
    }

    // Rule 3: any family-member attendee.
    if attendees.iter().any(|a| config.is_family_member_email(a))
        || organizer
            .as_deref()
            .is_some_and(|o| config.is_family_member_email(o))
    {
        if let Some(family) = config.family_circle() {
            return RoutingDecision {
                circle_id: family.clone(),
                reason: RoutingReason::P3,
            };
        }
    }

    if let (Some(graph), Some(organizer)) = (identity, organizer.as_deref()) {
        if let Some(person) = graph.find_person_by_email(organizer) {
            // Rule 4: organizer's org domain is a work domain.
            for org in graph.get_person_organizations(person) {
                if let Some(domain) = graph.organization_domain(org) {
                    if config.is_work_domain(&domain) {
                        if let Some(work) = config.work_circle() {
                            return RoutingDecision {
                                circle_id: work.clone(),
                                reason: RoutingReason::P4,
                            };
                        }
                    }
                }
            }
        }
    }

    if let Some(organizer) = organizer.as_deref() {
        let domain = domain_of(organizer);

        // Rule 5: organizer domain is a work domain.
        if config.is_work_domain(&domain) {
            if let Some(work) = config.work_circle() {
                return RoutingDecision {
                    circle_id: work.clone(),
                    reason: RoutingReason::P5,
                };
            }
        }

        // Rule 6: organizer domain is a personal domain.
        if config.is_personal_domain(&domain) {
            if let Some(personal) = config.personal_circle() {
                return RoutingDecision {
                    circle_id: personal.clone(),
                    reason: RoutingReason::P6,
                };
            }
        }
    }

    // Rule 7: default circle.
    default_decision(config)
}

fn route_finance(event: &CanonicalEvent, config: &RoutingConfig) -> RoutingDecision {
    let account = match &event.detail {
        EventDetail::Transaction { account } | EventDetail::Balance { account } => account,
        _ => return default_decision(config),
    };

    for circle in config.circles() {
        if circle.finance_accounts.contains(&account.to_lowercase()) {
            return RoutingDecision {
                circle_id: circle.id.clone(),
                reason: RoutingReason::P1,
            };
        }
    }

    default_decision(config)
}

fn default_decision(config: &RoutingConfig) -> RoutingDecision {
    RoutingDecision {
        circle_id: config.default_circle().clone(),
        reason: RoutingReason::P7,
    }
}

fn domain_of(email: &str) -> String {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantumlife_core::circle::Circle;
    use std::collections::BTreeSet;
    use time::macros::datetime;

    fn config_with(work_domains: &[&str], personal_domains: &[&str]) -> RoutingConfig {
        let default = Circle::new("inbox", "Inbox");
        RoutingConfig::new(
            vec![default],
            "inbox".into(),
            Some("family".into()),
            Some("work".into()),
            Some("personal".into()),
            work_domains.iter().map(|s| s.to_string()).collect(),
            personal_domains.iter().map(|s| s.to_string()).collect(),
            BTreeSet::from(["mom@family.example".to_string()]),
            BTreeSet::new(),
        )
    }

    fn email_event(sender: &str, receiver: &str) -> CanonicalEvent {
        CanonicalEvent::new(
            EventKind::Email,
            "gmail",
            receiver,
            "msg-1",
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-01-01 00:00 UTC),
            "preview",
            EventDetail::Email {
                sender: sender.to_string(),
                receiver_account: receiver.to_string(),
                subject: "hi".to_string(),
            },
        )
    }

    #[test]
    fn rule1_receiver_binding_wins_over_everything() {
        let mut config = config_with(&["work.example"], &[]);
        let mut bound = Circle::new("special", "Special");
        bound.mail_accounts.insert("me@bound.example".to_string());
        config = RoutingConfig::new(
            vec![bound, Circle::new("inbox", "Inbox")],
            "inbox".into(),
            None,
            Some("work".into()),
            None,
            BTreeSet::from(["work.example".to_string()]),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
        );
        let event = email_event("someone@work.example", "me@bound.example");
        let decision = route(&event, &config, None);
        assert_eq!(decision.circle_id, CircleId::from("special"));
        assert_eq!(decision.reason, RoutingReason::P1);
    }

    #[test]
    fn rule3_family_member_set() {
        let config = config_with(&[], &[]);
        let event = email_event("mom@family.example", "me@inbox.example");
        let decision = route(&event, &config, None);
        assert_eq!(decision.circle_id, CircleId::from("family"));
        assert_eq!(decision.reason, RoutingReason::P3);
    }

    #[test]
    fn rule5_work_domain() {
        let config = config_with(&["work.example"], &[]);
        let event = email_event("boss@work.example", "me@inbox.example");
        let decision = route(&event, &config, None);
        assert_eq!(decision.circle_id, CircleId::from("work"));
        assert_eq!(decision.reason, RoutingReason::P5);
    }

    #[test]
    fn rule6_personal_domain() {
        let config = config_with(&[], &["personal.example"]);
        let event = email_event("friend@personal.example", "me@inbox.example");
        let decision = route(&event, &config, None);
        assert_eq!(decision.circle_id, CircleId::from("personal"));
        assert_eq!(decision.reason, RoutingReason::P6);
    }

    #[test]
    fn rule7_default_fallback() {
        let config = config_with(&[], &[]);
        let event = email_event("stranger@nowhere.example", "me@inbox.example");
        let decision = route(&event, &config, None);
        assert_eq!(decision.circle_id, CircleId::from("inbox"));
        assert_eq!(decision.reason, RoutingReason::P7);
    }

    #[test]
    fn missing_identity_graph_degrades_to_config_only_routing() {
        let config = config_with(&["work.example"], &[]);
        let event = email_event("boss@work.example", "me@inbox.example");
        let with_graph = route(&event, &config, None);
        let without_graph = route(&event, &config, None);
        assert_eq!(with_graph, without_graph);
    }

    #[test]
    fn routing_is_deterministic_across_repeated_calls() {
        let config = config_with(&["work.example"], &["personal.example"]);
        let event = email_event("boss@work.example", "me@inbox.example");
        let a = route(&event, &config, None);
        let b = route(&event, &config, None);
        assert_eq!(a, b);
    }

    #[test]
    fn case_folded_domain_comparison() {
        let config = config_with(&["Work.Example"], &[]);
        let event = email_event("Boss@WORK.EXAMPLE", "me@inbox.example");
        let decision = route(&event, &config, None);
        assert_eq!(decision.reason, RoutingReason::P5);
    }
}
