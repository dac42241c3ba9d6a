//! Fuzz target for record canonicalization and edit handling
//!
//! Splits the input into four fields and drives a controller with them.
//!
//! Properties checked:
//! - Canonical length is the sum of field lengths plus three separators
//! - A record without separators in any field re-splits into the same fields
//! - Resetting always returns to the verified state

#![no_main]

use libfuzzer_sys::fuzz_target;
use proofmark::{
    canonical::{separator_collisions, SEPARATOR},
    canonicalize, Field, ProofConfig, ProofRecord, ProofStatus, StatusController,
};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut parts = text.splitn(4, '\u{0}');
    let record = ProofRecord::new(
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    );

    let message = canonicalize(&record);
    let field_len: usize = record.values().iter().map(|v| v.len()).sum();
    assert_eq!(message.len(), field_len + 3);

    if separator_collisions(&record).is_empty() {
        let message = String::from_utf8(message).expect("fields are valid UTF-8");
        let split: Vec<&str> = message.split(SEPARATOR).collect();
        assert_eq!(split, record.values());
    }

    let Ok(config) = ProofConfig::embedded() else {
        return;
    };
    let Ok(mut controller) = StatusController::new(config) else {
        return;
    };
    for field in Field::ALL {
        controller.on_field_edit(field, record.get(field));
    }
    assert_eq!(controller.on_reset().status(), ProofStatus::Verified);
});
