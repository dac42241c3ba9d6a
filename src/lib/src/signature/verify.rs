use log::*;

/// Verify an Ed25519 detached `signature` over `message` with `public_key`.
///
/// Fails closed: a key or signature of the wrong length, a key that is not a
/// valid curve point, or a non-canonical signature all yield `false`. Nothing
/// here panics or returns an error to the caller.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let pk = match ed25519_compact::PublicKey::from_slice(public_key) {
        Ok(pk) => pk,
        Err(e) => {
            debug!("Rejecting malformed public key ({} bytes): {e}", public_key.len());
            return false;
        }
    };
    let signature = match ed25519_compact::Signature::from_slice(signature) {
        Ok(signature) => signature,
        Err(e) => {
            debug!("Rejecting malformed signature ({} bytes): {e}", signature.len());
            return false;
        }
    };
    match pk.verify(message, &signature) {
        Ok(()) => true,
        Err(e) => {
            debug!("Signature does not match message: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_compact::{KeyPair, Seed};

    const MESSAGE: &[u8] =
        b"https://api.stripe.com/webhook|2024-01-15T10:30:45Z|200|3b7e72d4a8f9e1c2...";

    fn test_keypair(seed: u8) -> KeyPair {
        KeyPair::from_seed(Seed::new([seed; 32]))
    }

    #[test]
    fn test_verify_valid_signature() {
        let kp = test_keypair(1);
        let signature = kp.sk.sign(MESSAGE, None).to_vec();
        assert!(verify(MESSAGE, &signature, kp.pk.as_ref()));
    }

    #[test]
    fn test_verify_modified_message() {
        let kp = test_keypair(1);
        let signature = kp.sk.sign(MESSAGE, None).to_vec();
        let mut tampered = MESSAGE.to_vec();
        tampered[0] ^= 0x01;
        assert!(!verify(&tampered, &signature, kp.pk.as_ref()));
    }

    #[test]
    fn test_verify_wrong_key() {
        let kp1 = test_keypair(1);
        let kp2 = test_keypair(2);
        let signature = kp1.sk.sign(MESSAGE, None).to_vec();
        assert!(!verify(MESSAGE, &signature, kp2.pk.as_ref()));
    }

    #[test]
    fn test_verify_corrupted_signature() {
        let kp = test_keypair(3);
        let mut signature = kp.sk.sign(MESSAGE, None).to_vec();
        signature[10] ^= 0xFF;
        assert!(!verify(MESSAGE, &signature, kp.pk.as_ref()));
    }

    #[test]
    fn test_verify_short_signature_fails_closed() {
        let kp = test_keypair(4);
        let signature = kp.sk.sign(MESSAGE, None).to_vec();
        assert!(!verify(MESSAGE, &signature[..63], kp.pk.as_ref()));
        assert!(!verify(MESSAGE, &[], kp.pk.as_ref()));
    }

    #[test]
    fn test_verify_long_signature_fails_closed() {
        let kp = test_keypair(4);
        let mut signature = kp.sk.sign(MESSAGE, None).to_vec();
        signature.push(0);
        assert!(!verify(MESSAGE, &signature, kp.pk.as_ref()));
    }

    #[test]
    fn test_verify_bad_public_key_length_fails_closed() {
        let kp = test_keypair(5);
        let signature = kp.sk.sign(MESSAGE, None).to_vec();
        assert!(!verify(MESSAGE, &signature, &kp.pk.as_ref()[..31]));
        assert!(!verify(MESSAGE, &signature, &[]));
    }

    #[test]
    fn test_verify_zero_key_fails_closed() {
        let kp = test_keypair(6);
        let signature = kp.sk.sign(MESSAGE, None).to_vec();
        assert!(!verify(MESSAGE, &signature, &[0u8; 32]));
    }

    #[test]
    fn test_verify_empty_message() {
        let kp = test_keypair(7);
        let signature = kp.sk.sign(b"", None).to_vec();
        assert!(verify(b"", &signature, kp.pk.as_ref()));
        assert!(!verify(b"x", &signature, kp.pk.as_ref()));
    }
}
