//! SHA-256 content addressing.
//!
//! Every hash in the pipeline is hex-encoded SHA-256. "Full" hashes are the
//! 64-char hex digest, "short" hashes are the leading 32 chars (128 bits),
//! and display "prefixes" are the leading 8 chars. There is exactly one
//! algorithm in this system: QuantumLife fixes SHA-256 since the wire format
//! is bit-exact and algorithm-agility would break it.

use sha2::{Digest, Sha256};

/// Hex-encode the SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// The full 64-char hex digest.
pub fn full_hash(data: &[u8]) -> String {
    sha256_hex(data)
}

/// The leading 32 hex chars (128 bits) of the digest.
pub fn short_hash(data: &[u8]) -> String {
    full_hash(data)[..32].to_string()
}

/// The leading 8 hex chars of the digest, for display only — never used as
/// a lookup key.
pub fn prefix8(data: &[u8]) -> String {
    full_hash(data)[..8].to_string()
}

/// Build a pipe-delimited canonical string from ordered, already-stringified
/// fields. Every canonical string in this system — event ids, attempt ids,
/// receipt canonical forms, claim messages — is built through this one
/// function so there is a single place the delimiter and field order are
/// decided.
///
/// `tag` is the record type (e.g. `"REHEARSAL_RECEIPT"`), `version` is the
/// format version (`"v1"`), and `fields` are the remaining components in
/// their fixed, struct-defined order.
pub fn canonical_string(tag: &str, version: &str, fields: &[&str]) -> String {
    let mut parts = Vec::with_capacity(fields.len() + 2);
    parts.push(tag);
    parts.push(version);
    parts.extend_from_slice(fields);
    parts.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hash_is_64_hex_chars() {
        let h = full_hash(b"hello world");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn short_hash_is_prefix_of_full_hash() {
        let data = b"quantumlife";
        assert_eq!(short_hash(data), full_hash(data)[..32]);
        assert_eq!(prefix8(data), full_hash(data)[..8]);
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(full_hash(b"same input"), full_hash(b"same input"));
    }

    #[test]
    fn canonical_string_joins_with_pipe_in_order() {
        let s = canonical_string("REHEARSAL_RECEIPT", "v1", &["requested", "none", "2024-01-01"]);
        assert_eq!(s, "REHEARSAL_RECEIPT|v1|requested|none|2024-01-01");
    }
}
