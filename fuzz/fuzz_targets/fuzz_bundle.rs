//! Fuzz target for proof bundle parsing
//!
//! Security concerns:
//! - Deeply nested or oversized JSON
//! - Bundles that parse but carry malformed constants

#![no_main]

use libfuzzer_sys::fuzz_target;
use proofmark::{ProofBundle, ProofConfig, StatusController};

fuzz_target!(|data: &[u8]| {
    if let Ok(bundle) = ProofBundle::from_json(data) {
        if let Ok(config) = ProofConfig::from_bundle(&bundle) {
            let _ = StatusController::new(config);
        }
        if let Ok(serialized) = bundle.to_json() {
            let _ = ProofBundle::from_json(&serialized);
        }
    }
});
