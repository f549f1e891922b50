//! Integration tests for the View Snapshotter's determinism contract.

use quantumlife_core::circle::CircleId;
use quantumlife_core::clock::FixedClock;
use quantumlife_view::{snapshot, ViewInputs};

#[test]
fn field_order_changes_propagate_into_the_hash() {
    let clock = FixedClock::from_unix(1_700_500_000);
    let circle_id = CircleId::from("finance");

    let baseline = snapshot(
        &circle_id,
        &ViewInputs {
            unread_mail_count: 1,
            important_mail_count: 2,
            upcoming_calendar_count: 3,
            today_calendar_count: 4,
            pending_transaction_count: 5,
            new_transaction_count: 6,
            balance_minor: 700,
        },
        &clock,
    );

    let swapped_counts = snapshot(
        &circle_id,
        &ViewInputs {
            unread_mail_count: 2,
            important_mail_count: 1,
            upcoming_calendar_count: 3,
            today_calendar_count: 4,
            pending_transaction_count: 5,
            new_transaction_count: 6,
            balance_minor: 700,
        },
        &clock,
    );

    assert_ne!(baseline.content_hash, swapped_counts.content_hash);
}

#[test]
fn snapshot_is_scoped_to_the_clocks_period() {
    let day_one = FixedClock::from_unix(1_700_000_000);
    let day_two = FixedClock::from_unix(1_700_100_000);
    let circle_id = CircleId::from("work");
    let inputs = ViewInputs {
        unread_mail_count: 1,
        ..ViewInputs::default()
    };

    let first = snapshot(&circle_id, &inputs, &day_one);
    let second = snapshot(&circle_id, &inputs, &day_two);

    assert_ne!(first.period_key, second.period_key);
}
