//! Property tests for router totality and determinism.

use proptest::prelude::*;
use time::OffsetDateTime;

use quantumlife_core::circle::{Circle, CircleId, RoutingConfig};
use quantumlife_core::events::{CanonicalEvent, EventDetail, EventKind};
use quantumlife_router::route;

fn config() -> RoutingConfig {
    RoutingConfig::new(
        vec![
            Circle::new("default", "Default"),
            Circle::new("work", "Work"),
            Circle::new("personal", "Personal"),
        ],
        CircleId::from("default"),
        None,
        Some(CircleId::from("work")),
        Some(CircleId::from("personal")),
        ["corp.example".to_string()].into_iter().collect(),
        ["gmail.example".to_string()].into_iter().collect(),
        Default::default(),
        Default::default(),
    )
}

fn sender_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("alice@corp.example".to_string()),
        Just("bob@gmail.example".to_string()),
        Just("carol@nowhere.example".to_string()),
    ]
}

fn email_event(sender: String) -> CanonicalEvent {
    CanonicalEvent::new(
        EventKind::Email,
        "gmail",
        "inbox@example.com",
        "msg-1",
        OffsetDateTime::UNIX_EPOCH,
        OffsetDateTime::UNIX_EPOCH,
        "hello",
        EventDetail::Email {
            sender,
            receiver_account: "inbox@example.com".to_string(),
            subject: "hello".to_string(),
        },
    )
}

proptest! {
    #[test]
    fn routing_is_total_and_deterministic(sender in sender_strategy()) {
        let cfg = config();
        let event = email_event(sender);
        let first = route(&event, &cfg, None);
        let second = route(&event, &cfg, None);
        prop_assert_eq!(first.circle_id, second.circle_id);
        prop_assert_eq!(first.reason, second.reason);
        prop_assert!(cfg.circles().iter().any(|c| c.id == first.circle_id));
    }
}
