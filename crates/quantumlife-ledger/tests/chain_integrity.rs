//! Integration test: the ledger's chain survives interleaved record types
//! and circles.

use quantumlife_ledger::Ledger;

#[test]
fn interleaved_appends_still_form_one_valid_chain() {
    let mut ledger = Ledger::new();
    ledger.append("routing_decision", "circle-a", "ROUTING_DECISION|v1|a".to_string());
    ledger.append("view_snapshot", "circle-b", "VIEW_SNAPSHOT|v1|b".to_string());
    ledger.append("trust_action_receipt", "circle-a", "TRUST_ACTION|v1|c".to_string());

    assert!(ledger.verify());
    assert_eq!(ledger.count(), 3);
    assert_eq!(ledger.list_by_circle("circle-a").len(), 2);
    assert_eq!(ledger.list_by_type("view_snapshot").len(), 1);
}

#[test]
fn empty_ledger_verifies_trivially() {
    let ledger = Ledger::new();
    assert!(ledger.verify());
    assert_eq!(ledger.count(), 0);
}

#[test]
fn prev_hash_links_are_distinct_even_for_identical_content() {
    let mut ledger = Ledger::new();
    let first = ledger
        .append("routing_decision", "circle-a", "same-content".to_string())
        .record_hash
        .clone();
    let second = ledger.append("routing_decision", "circle-a", "same-content".to_string());
    assert_eq!(second.prev_hash, first);
}
