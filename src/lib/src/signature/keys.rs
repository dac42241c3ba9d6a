pub use crate::error::*;

use std::fmt;

/// Length of an Ed25519 public key, in bytes.
pub const PUBLIC_KEY_BYTES: usize = 32;

/// Length of an Ed25519 detached signature, in bytes.
pub const SIGNATURE_BYTES: usize = 64;

/// Public key of the embedded demo proof.
pub const EMBEDDED_PUBLIC_KEY_HEX: &str =
    "5e07cbe0cd913e484aae0dd71e9f91753722382c80ae189eae94e2c7c6cec3b9";

/// Detached signature over the canonical encoding of the embedded demo record.
pub const EMBEDDED_SIGNATURE_HEX: &str = "840978c9af0f643ecf83e3127db7cbeba613c1ad5314d7febec9742850ada2760a14882eb86351c34a1f80fbf2a6ad8278be07c59ef00207610539e0f2940301";

/// Decode a hex string into raw bytes.
///
/// Two hex characters make one byte. Both cases are accepted. An odd length
/// or an invalid pair is reported as [`PMError::MalformedConstant`].
pub fn decode_hex(hex_string: &str) -> Result<Vec<u8>, PMError> {
    Ok(hex::decode(hex_string)?)
}

fn decode_fixed<const N: usize>(what: &str, hex_string: &str) -> Result<[u8; N], PMError> {
    let bytes = decode_hex(hex_string).map_err(|e| match e {
        PMError::MalformedConstant(reason) => PMError::MalformedConstant(format!("{what}: {reason}")),
        e => e,
    })?;
    bytes.as_slice().try_into().map_err(|_| {
        PMError::MalformedConstant(format!(
            "{what}: expected {N} bytes, got {}",
            bytes.len()
        ))
    })
}

/// The public key and detached signature a proof is checked against.
///
/// Built once at startup and passed explicitly to whatever needs to verify.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct KeyMaterial {
    public_key: [u8; PUBLIC_KEY_BYTES],
    signature: [u8; SIGNATURE_BYTES],
}

impl KeyMaterial {
    /// Create key material from raw fixed-size values.
    pub fn new(public_key: [u8; PUBLIC_KEY_BYTES], signature: [u8; SIGNATURE_BYTES]) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    /// Decode hex-encoded key material.
    pub fn from_hex(public_key_hex: &str, signature_hex: &str) -> Result<Self, PMError> {
        Ok(Self::new(
            decode_fixed("public key", public_key_hex)?,
            decode_fixed("signature", signature_hex)?,
        ))
    }

    /// The key material of the embedded demo proof.
    pub fn embedded() -> Result<Self, PMError> {
        Self::from_hex(EMBEDDED_PUBLIC_KEY_HEX, EMBEDDED_SIGNATURE_HEX)
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_BYTES] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.signature
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature)
    }

    /// Check the stored signature against `message`.
    pub fn verify(&self, message: &[u8]) -> bool {
        super::verify(message, &self.signature, &self.public_key)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KeyMaterial {{ pk: [{}], signature: [{}...] }}",
            self.public_key_hex(),
            &self.signature_hex()[..16]
        )
    }
}
