//! Integration test: a signer and the verifier must never disagree on
//! canonical message bytes.

use ed25519_dalek::SigningKey;
use quantumlife_claims::{testing::sign, verify, VerificationStatus};
use quantumlife_core::circle::CircleId;
use rand::rngs::OsRng;

#[test]
fn two_distinct_keys_produce_distinct_fingerprints() {
    let key_a = SigningKey::generate(&mut OsRng);
    let key_b = SigningKey::generate(&mut OsRng);

    let fields = vec![("manifest_id".to_string(), "pack-1".to_string())];
    let claim_a = sign(
        "pack_manifest",
        fields.clone(),
        CircleId::from("work"),
        "2026-02-01",
        "2026-02-01T10:00",
        "quantumlife-registry",
        &key_a,
    );
    let claim_b = sign(
        "pack_manifest",
        fields,
        CircleId::from("work"),
        "2026-02-01",
        "2026-02-01T10:00",
        "quantumlife-registry",
        &key_b,
    );

    let record_a = verify(&claim_a);
    let record_b = verify(&claim_b);

    assert_eq!(record_a.status, VerificationStatus::Ok);
    assert_eq!(record_b.status, VerificationStatus::Ok);
    assert_ne!(record_a.fingerprint, record_b.fingerprint);
    assert_eq!(record_a.content_hash, record_b.content_hash);
}
