//! End-to-end tests for the proof verification workflow
//!
//! These tests drive a `StatusController` the way a front-end would:
//! 1. Start a session from the embedded proof (or a bundle file)
//! 2. Feed it field edits and reset requests
//! 3. Check the status, digest and reset control after every event

use proofmark::{
    canonicalize,
    config::ProofBundle,
    digest::DIGEST_PENDING,
    verify, Event, Field, KeyMaterial, PMError, ProofConfig, ProofRecord, ProofStatus,
    ResetControl, Sha256Engine, StatusController,
};

use ed25519_compact::{KeyPair, Seed};

fn embedded_controller() -> StatusController {
    StatusController::new(ProofConfig::embedded().unwrap()).unwrap()
}

/// A bundle signed with a throwaway key.
fn signed_bundle(record: ProofRecord) -> ProofBundle {
    let kp = KeyPair::from_seed(Seed::new([42u8; 32]));
    let signature = kp.sk.sign(canonicalize(&record), None);
    ProofBundle {
        public_key: hex::encode(kp.pk.as_ref()),
        signature: hex::encode(signature.to_vec()),
        record,
    }
}

#[test]
fn test_scenario_original_record_verified() {
    let c = embedded_controller();
    assert_eq!(
        c.record(),
        &ProofRecord::new(
            "https://api.stripe.com/webhook",
            "2024-01-15T10:30:45Z",
            "200",
            "3b7e72d4a8f9e1c2...",
        )
    );
    assert_eq!(c.status(), ProofStatus::Verified);
    assert_eq!(c.display().reset_control(), ResetControl::Hidden);
}

#[test]
fn test_scenario_status_500_tampered_then_reset() {
    let mut c = embedded_controller();

    let display = c.handle(Event::edit(Field::Status, "500"));
    assert_eq!(display.status(), ProofStatus::Tampered);
    assert_eq!(display.reset_control(), ResetControl::Visible);

    let display = c.handle(Event::ResetRequested);
    assert_eq!(display.status(), ProofStatus::Verified);
    assert_eq!(display.reset_control(), ResetControl::Hidden);
}

#[test]
fn test_original_record_verifies_with_constants() {
    let keys = KeyMaterial::embedded().unwrap();
    let record = ProofBundle::embedded().record;
    assert!(verify(
        &canonicalize(&record),
        keys.signature(),
        keys.public_key()
    ));
}

#[test]
fn test_single_byte_changes_never_verify() {
    let keys = KeyMaterial::embedded().unwrap();
    let original = ProofBundle::embedded().record;
    for field in Field::ALL {
        let value = original.get(field).to_string();
        for i in 0..value.len() {
            let mut bytes = value.clone().into_bytes();
            if !bytes[i].is_ascii_alphanumeric() {
                continue;
            }
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let mut record = original.clone();
            record.set(field, String::from_utf8(bytes).unwrap());
            assert!(
                !keys.verify(&canonicalize(&record)),
                "field {field} byte {i} still verifies"
            );
        }
    }
}

#[test]
fn test_reset_after_arbitrary_edits() {
    let sequences: &[&[(Field, &str)]] = &[
        &[],
        &[(Field::Status, "500")],
        &[(Field::Url, ""), (Field::Timestamp, ""), (Field::Status, ""), (Field::Hash, "")],
        &[(Field::Hash, "a|b"), (Field::Url, "|")],
        &[(Field::Status, "200"), (Field::Status, "2000"), (Field::Status, "20")],
    ];
    for edits in sequences {
        let mut c = embedded_controller();
        for (field, value) in edits.iter() {
            c.on_field_edit(*field, *value);
        }
        assert_eq!(c.on_reset().status(), ProofStatus::Verified);
        assert_eq!(c.record(), c.original().record());
    }
}

#[test]
fn test_custom_bundle_session() {
    let record = ProofRecord::new(
        "https://hooks.example.com/payments",
        "2025-06-01T08:00:00Z",
        "204",
        "9f86d081884c7d65...",
    );
    let bundle = signed_bundle(record);
    let config = ProofConfig::from_bundle(&bundle).unwrap();
    let mut c = StatusController::new(config).unwrap();
    assert_eq!(c.status(), ProofStatus::Verified);

    c.on_field_edit(Field::Timestamp, "2025-06-01T08:00:01Z");
    assert_eq!(c.status(), ProofStatus::Tampered);
    c.on_reset();
    assert_eq!(c.status(), ProofStatus::Verified);
}

#[test]
fn test_bundle_with_foreign_signature_fails_self_test() {
    let mut bundle = signed_bundle(ProofBundle::embedded().record);
    bundle.public_key = ProofBundle::embedded().public_key;
    let config = ProofConfig::from_bundle(&bundle).unwrap();
    assert!(matches!(
        StatusController::new(config),
        Err(PMError::SelfTestFailed)
    ));
}

#[test]
fn test_malformed_constants_fail_at_startup() {
    let mut bundle = ProofBundle::embedded();
    bundle.signature.pop();
    assert!(matches!(
        ProofConfig::from_bundle(&bundle),
        Err(PMError::MalformedConstant(_))
    ));

    let mut bundle = ProofBundle::embedded();
    bundle.public_key.replace_range(0..2, "xy");
    assert!(matches!(
        ProofConfig::from_bundle(&bundle),
        Err(PMError::MalformedConstant(_))
    ));
}

#[test]
fn test_bundle_file_session() {
    let path = std::env::temp_dir().join(format!("proofmark-e2e-{}.json", std::process::id()));
    ProofBundle::embedded().to_file(&path).unwrap();

    let config = ProofConfig::load(Some(&path)).unwrap();
    let c = StatusController::new(config).unwrap();
    assert_eq!(c.status(), ProofStatus::Verified);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_deferred_digests_last_issued_wins() {
    let mut c = embedded_controller();

    let requests: Vec<_> = ["500", "404", "200"]
        .into_iter()
        .map(|status| c.dispatch(Event::edit(Field::Status, status)))
        .collect();
    assert_eq!(c.display().digest.as_str(), DIGEST_PENDING);
    assert_eq!(c.status(), ProofStatus::Verified);

    // Complete in reverse order: only the last issued request may land.
    let mut applied = Vec::new();
    for request in requests.iter().rev() {
        let result = request.compute(&Sha256Engine);
        applied.push(c.complete_digest(request.ticket(), result));
    }
    assert_eq!(applied, vec![true, false, false]);
    assert_eq!(c.display().digest.as_str(), "61526fb1...7161e148");
}
