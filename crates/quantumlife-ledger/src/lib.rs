//! Canonical Audit Ledger — an append-only, hash-chained record store.
//! Every record's hash folds in the previous record's hash, so any
//! tampering breaks `verify`'s recomputation.

#![forbid(unsafe_code)]

pub mod replay;

use std::collections::BTreeMap;

use quantumlife_core::hashing::full_hash;

const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

/// One append-only entry: a type tag, the canonical string it was built
/// from, and the hash chain linking it to the record before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub type_tag: String,
    pub canonical_string: String,
    pub record_hash: String,
    pub sequence_no: u64,
    pub prev_hash: String,
    pub circle_id_hash: String,
}

/// In-memory, append-only ledger plus type/circle indexes.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<LedgerRecord>,
    by_type: BTreeMap<String, Vec<usize>>,
    by_circle: BTreeMap<String, Vec<usize>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new record, chaining it to the previous `record_hash` (or
    /// the genesis hash if this is the first).
    pub fn append(&mut self, type_tag: &str, circle_id_hash: &str, canonical_string: String) -> &LedgerRecord {
        let prev_hash = self
            .records
            .last()
            .map(|r| r.record_hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let record_hash = full_hash(canonical_string.as_bytes());
        let sequence_no = self.records.len() as u64;

        let record = LedgerRecord {
            type_tag: type_tag.to_string(),
            canonical_string,
            record_hash,
            sequence_no,
            prev_hash,
            circle_id_hash: circle_id_hash.to_string(),
        };

        let index = self.records.len();
        self.by_type.entry(type_tag.to_string()).or_default().push(index);
        self.by_circle.entry(circle_id_hash.to_string()).or_default().push(index);
        self.records.push(record);
        self.records.last().expect("just pushed")
    }

    pub fn contains(&self, record_hash: &str) -> bool {
        self.records.iter().any(|r| r.record_hash == record_hash)
    }

    pub fn list_by_type(&self, type_tag: &str) -> Vec<&LedgerRecord> {
        self.by_type
            .get(type_tag)
            .into_iter()
            .flatten()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn list_by_circle(&self, circle_id_hash: &str) -> Vec<&LedgerRecord> {
        self.by_circle
            .get(circle_id_hash)
            .into_iter()
            .flatten()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Recompute the full hash chain; `false` if any record's hash or
    /// `prev_hash` link doesn't match.
    pub fn verify(&self) -> bool {
        let mut expected_prev = GENESIS_HASH.to_string();
        for record in &self.records {
            if record.prev_hash != expected_prev {
                return false;
            }
            if record.record_hash != full_hash(record.canonical_string.as_bytes()) {
                return false;
            }
            expected_prev = record.record_hash.clone();
        }
        true
    }
}
