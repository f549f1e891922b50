//! Signed Claim Verifier — Ed25519 verification of vendor claims and pack
//! manifests, producing hash-only records.
//!
//! No storage, no network, no policy effect. `verify` is infallible: a
//! malformed claim still produces a `ClaimRecord`, never an `Err`. The
//! canonical message bytes are built by exactly one function so a signer
//! and a verifier can never drift apart on wire format.

#![forbid(unsafe_code)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, VerifyingKey};

use quantumlife_core::circle::CircleId;
use quantumlife_core::hashing::full_hash;

const CANONICAL_VERSION: &str = "v1";
const PUBLIC_KEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

/// A single `field=value` component, in struct-declared order.
pub type ClaimField = (String, String);

/// An Ed25519-signed vendor claim or pack manifest, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedClaim {
    pub kind: String,
    pub fields: Vec<ClaimField>,
    pub circle_id: CircleId,
    pub period_key: String,
    pub created_bucket: String,
    pub provenance: String,
    pub public_key_b64: String,
    pub signature_b64: String,
}

/// Build the canonical message bytes signed and verified: version-prefixed,
/// pipe-delimited, `field=value` components in the order given.
///
/// The single source of truth for wire format — a signer and `verify` must
/// both call this, never reimplement it.
pub fn canonical_message_bytes(kind: &str, fields: &[ClaimField]) -> Vec<u8> {
    let mut parts = Vec::with_capacity(fields.len() + 2);
    parts.push(CANONICAL_VERSION.to_string());
    parts.push(kind.to_string());
    parts.extend(fields.iter().map(|(k, v)| format!("{k}={v}")));
    parts.join("|").into_bytes()
}

/// Outcome of verifying one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Ok,
    BadSignature,
    BadFormat,
}

/// A hash-only record of a verification. No raw key material is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    pub status: VerificationStatus,
    pub fingerprint: Option<String>,
    pub content_hash: String,
    pub provenance: String,
    pub period_key: String,
    pub circle_id_hash: String,
    pub created_bucket: String,
}

/// Verify a claim. Never fails: a malformed public key or signature still
/// produces a record, with status `bad_format`.
pub fn verify(claim: &SignedClaim) -> ClaimRecord {
    let message = canonical_message_bytes(&claim.kind, &claim.fields);
    let content_hash = full_hash(&message);
    let circle_id_hash = full_hash(claim.circle_id.to_string().as_bytes());

    let base = ClaimRecord {
        status: VerificationStatus::BadFormat,
        fingerprint: None,
        content_hash: content_hash.clone(),
        provenance: claim.provenance.clone(),
        period_key: claim.period_key.clone(),
        circle_id_hash: circle_id_hash.clone(),
        created_bucket: claim.created_bucket.clone(),
    };

    let Ok(public_key_bytes) = BASE64.decode(&claim.public_key_b64) else {
        return base;
    };
    let Ok(public_key_bytes): Result<[u8; PUBLIC_KEY_LEN], _> = public_key_bytes.try_into() else {
        return base;
    };
    let Ok(signature_bytes) = BASE64.decode(&claim.signature_b64) else {
        return base;
    };
    let Ok(signature_bytes): Result<[u8; SIGNATURE_LEN], _> = signature_bytes.try_into() else {
        return base;
    };

    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key_bytes) else {
        return base;
    };
    let signature = Signature::from_bytes(&signature_bytes);
    let fingerprint = hex::encode(sha256_digest(&public_key_bytes));

    let status = if verifying_key.verify_strict(&message, &signature).is_ok() {
        VerificationStatus::Ok
    } else {
        VerificationStatus::BadSignature
    };

    ClaimRecord {
        status,
        fingerprint: Some(fingerprint),
        ..base
    }
}

/// Raw (non-hex) SHA-256 digest — `core::hashing` only exposes the
/// hex-encoded form, and the fingerprint needs the bytes to hex-encode
/// itself via `hex::encode`.
fn sha256_digest(public_key_bytes: &[u8; PUBLIC_KEY_LEN]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(public_key_bytes);
    hasher.finalize().into()
}

/// Test-fixture signing, sharing `canonical_message_bytes` with `verify` so
/// fixtures can never drift from the verifier's wire format.
pub mod testing {
    use super::{canonical_message_bytes, ClaimField, SignedClaim, BASE64};
    use base64::Engine;
    use ed25519_dalek::{Signer, SigningKey};
    use quantumlife_core::circle::CircleId;

    /// Sign `fields` under `kind` with `signing_key`, producing a claim
    /// ready to hand to `verify`.
    #[allow(clippy::too_many_arguments)]
    pub fn sign(
        kind: &str,
        fields: Vec<ClaimField>,
        circle_id: CircleId,
        period_key: &str,
        created_bucket: &str,
        provenance: &str,
        signing_key: &SigningKey,
    ) -> SignedClaim {
        let message = canonical_message_bytes(kind, &fields);
        let signature = signing_key.sign(&message);
        SignedClaim {
            kind: kind.to_string(),
            fields,
            circle_id,
            period_key: period_key.to_string(),
            created_bucket: created_bucket.to_string(),
            provenance: provenance.to_string(),
            public_key_b64: BASE64.encode(signing_key.verifying_key().to_bytes()),
            signature_b64: BASE64.encode(signature.to_bytes()),
        }
    }
}
