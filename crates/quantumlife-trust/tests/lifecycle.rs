//! Integration test for the execute/undo lifecycle against a circle.

use quantumlife_core::circle::CircleId;
use quantumlife_core::clock::FixedClock;
use quantumlife_trust::{
    check_eligibility, execute, undo, CalendarExecutor, CalendarResponseDraft, ExecutionFailed,
    InMemoryTrustActionStore, ResponseStatus, TrustActionState,
};

struct AlwaysSucceeds;
impl CalendarExecutor for AlwaysSucceeds {
    fn respond(&self, _draft: &CalendarResponseDraft) -> Result<(), ExecutionFailed> {
        Ok(())
    }
}

#[test]
fn full_lifecycle_executes_then_undoes_with_inverted_response() {
    let mut store = InMemoryTrustActionStore::new();
    let circle_id = CircleId::from("family");
    let clock = FixedClock::from_unix(1_700_000_000);

    let draft = CalendarResponseDraft {
        draft_id: "draft-1".to_string(),
        response: ResponseStatus::Accepted,
        previous_response_status: ResponseStatus::Declined,
        envelope_hash: "envelope-hash-abc".to_string(),
    };

    let eligibility =
        check_eligibility(&circle_id, "2026-03-15", true, true, &[draft], &store).unwrap();
    let receipt = execute(eligibility, &AlwaysSucceeds, &clock, &mut store).unwrap();
    assert_eq!(receipt.state, TrustActionState::Executed);

    let undone = undo(&receipt.receipt_id, &AlwaysSucceeds, &clock, &mut store).unwrap();
    assert_eq!(undone.state, TrustActionState::Undone);
    assert_eq!(undone.receipt_id, receipt.receipt_id);
}
