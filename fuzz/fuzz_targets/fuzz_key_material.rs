//! Fuzz target for key material decoding and verification
//!
//! This target feeds arbitrary text to the hex decoder and arbitrary bytes
//! to the verifier.
//!
//! Security concerns:
//! - Panics on odd-length or non-hex input
//! - Length confusion between public key and signature
//! - Verification accepting malformed keys or signatures

#![no_main]

use libfuzzer_sys::fuzz_target;
use proofmark::{verify, KeyMaterial, PUBLIC_KEY_BYTES, SIGNATURE_BYTES};

fuzz_target!(|data: &[u8]| {
    // Hex constants (if data is valid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        let (pk_hex, sig_hex) = s.split_once(':').unwrap_or((s, ""));
        if let Ok(keys) = KeyMaterial::from_hex(pk_hex, sig_hex) {
            let _ = keys.verify(data);
            assert_eq!(keys.public_key_hex().len(), PUBLIC_KEY_BYTES * 2);
            assert_eq!(keys.signature_hex().len(), SIGNATURE_BYTES * 2);
        }
    }

    // Raw bytes: wrong lengths must be rejected without panicking
    if data.len() >= PUBLIC_KEY_BYTES + SIGNATURE_BYTES {
        let (pk, rest) = data.split_at(PUBLIC_KEY_BYTES);
        let (sig, msg) = rest.split_at(SIGNATURE_BYTES);
        let _ = verify(msg, sig, pk);
    }
    let _ = verify(data, data, data);
});
