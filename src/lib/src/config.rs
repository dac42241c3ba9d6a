//! Proof configuration and the proof bundle file format.

use crate::error::PMError;
use crate::record::{OriginalRecord, ProofRecord};
use crate::signature::{KeyMaterial, EMBEDDED_PUBLIC_KEY_HEX, EMBEDDED_SIGNATURE_HEX};
use log::*;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Environment variable naming a proof bundle to load instead of the embedded one.
pub const BUNDLE_ENV_VAR: &str = "PROOFMARK_BUNDLE";

/// A signed record together with the key that verifies it, as stored on disk.
///
/// ```json
/// {
///   "public_key": "5e07cbe0...",
///   "signature": "840978c9...",
///   "record": {
///     "url": "https://api.stripe.com/webhook",
///     "timestamp": "2024-01-15T10:30:45Z",
///     "status": "200",
///     "hash": "3b7e72d4a8f9e1c2..."
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Hex-encoded Ed25519 public key
    pub public_key: String,
    /// Hex-encoded detached signature over the canonical record
    pub signature: String,
    /// The record as signed
    pub record: ProofRecord,
}

impl ProofBundle {
    /// The compiled-in demo proof.
    pub fn embedded() -> Self {
        Self {
            public_key: EMBEDDED_PUBLIC_KEY_HEX.to_string(),
            signature: EMBEDDED_SIGNATURE_HEX.to_string(),
            record: ProofRecord::new(
                "https://api.stripe.com/webhook",
                "2024-01-15T10:30:45Z",
                "200",
                "3b7e72d4a8f9e1c2...",
            ),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<Vec<u8>, PMError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(data: &[u8]) -> Result<Self, PMError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PMError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            PMError::InternalError(format!("Failed to read bundle '{}': {}", path.display(), e))
        })?;
        Self::from_json(&data)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), PMError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load the bundle from `path`, then [`BUNDLE_ENV_VAR`], then the embedded bundle.
    ///
    /// An empty environment variable counts as unset.
    pub fn load(path: Option<&Path>) -> Result<Self, PMError> {
        Self::load_with_env(path, std::env::var_os(BUNDLE_ENV_VAR))
    }

    fn load_with_env(path: Option<&Path>, env_path: Option<OsString>) -> Result<Self, PMError> {
        if let Some(path) = path {
            debug!("Loading proof bundle from [{}]", path.display());
            return Self::from_file(path);
        }
        match env_path {
            Some(path) if !path.is_empty() => {
                debug!("Loading proof bundle from ${BUNDLE_ENV_VAR}");
                Self::from_file(path)
            }
            _ => Ok(Self::embedded()),
        }
    }
}

impl Default for ProofBundle {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Immutable configuration of a verification session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofConfig {
    pub keys: KeyMaterial,
    pub original: OriginalRecord,
}

impl ProofConfig {
    pub fn new(keys: KeyMaterial, original: ProofRecord) -> Self {
        Self {
            keys,
            original: OriginalRecord::new(original),
        }
    }

    /// Configuration for the compiled-in demo proof.
    pub fn embedded() -> Result<Self, PMError> {
        Self::from_bundle(&ProofBundle::embedded())
    }

    /// Decode the key material of a bundle.
    ///
    /// Malformed hex is fatal: no valid session can be built from it.
    pub fn from_bundle(bundle: &ProofBundle) -> Result<Self, PMError> {
        let keys = KeyMaterial::from_hex(&bundle.public_key, &bundle.signature)?;
        Ok(Self::new(keys, bundle.record.clone()))
    }

    /// Load the configuration from `path`, then [`BUNDLE_ENV_VAR`], then the embedded bundle.
    pub fn load(path: Option<&Path>) -> Result<Self, PMError> {
        Self::from_bundle(&ProofBundle::load(path)?)
    }
}
