//! Replay bundling — packages ledger records into a bounded, hash-addressed
//! transfer bundle.
//!
//! Only record types on `SAFE_FOR_EXPORT` may leave the ledger this way, and
//! every field is re-validated against the forbidden-pattern gate even
//! though it was presumably already clean when first appended — a bundle is
//! a new trust boundary, so it earns its own check.

use thiserror::Error;

use quantumlife_core::content_safety::{validate_user_visible, ContentPolicyError};

use crate::{Ledger, LedgerRecord};

/// Record type tags that may be included in an export bundle. Anything not
/// on this list is refused, even if it would otherwise pass content safety.
pub const SAFE_FOR_EXPORT: &[&str] = &[
    "routing_decision",
    "commerce_event",
    "view_snapshot",
    "permission_result",
    "rehearsal_receipt",
    "trust_action_receipt",
    "claim_record",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("record type '{0}' is not on the safe-for-export allow-list")]
    TypeNotAllowed(String),
    #[error("record failed content safety re-validation: {0}")]
    ForbiddenContent(#[from] ContentPolicyError),
}

/// A bounded set of ledger records packaged for transfer, in sequence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayBundle {
    pub records: Vec<LedgerRecord>,
    pub bundle_hash: String,
}

/// Build a bundle of every record whose type tag is in `type_tags`, all of
/// which must already be on `SAFE_FOR_EXPORT`.
pub fn build_replay_bundle(ledger: &Ledger, type_tags: &[&str]) -> Result<ReplayBundle, ReplayError> {
    for tag in type_tags {
        if !SAFE_FOR_EXPORT.contains(tag) {
            return Err(ReplayError::TypeNotAllowed((*tag).to_string()));
        }
    }

    let mut records: Vec<LedgerRecord> = type_tags
        .iter()
        .flat_map(|tag| ledger.list_by_type(tag).into_iter().cloned())
        .collect();
    records.sort_by_key(|r| r.sequence_no);

    for record in &records {
        validate_user_visible(&record.canonical_string)?;
    }

    let joined = records
        .iter()
        .map(|r| r.record_hash.as_str())
        .collect::<Vec<_>>()
        .join("|");
    let bundle_hash = quantumlife_core::hashing::full_hash(joined.as_bytes());

    Ok(ReplayBundle { records, bundle_hash })
}
