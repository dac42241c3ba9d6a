//! Signed proof records with live tamper detection.
//!
//! A proof record is canonicalized, checked against a detached Ed25519
//! signature, and shown with a short SHA-256 display digest. Edits flip the
//! status between verified and tampered; a reset restores the signed values.

// `StatusController` is what most front-ends should drive.
// `signature::verify()` is the primitive for callers that only need a yes/no answer.

#![forbid(unsafe_code)]

mod error;
mod record;
mod signature;

/// Canonical byte encoding of proof records
pub mod canonical;

/// Display digest computation and request supersession
pub mod digest;

/// Proof configuration and bundle files
pub mod config;

/// The verify/tamper state machine
pub mod controller;

/// Structured audit logging
///
/// Mirrors every user-visible state change as a `tracing` event, so that a
/// session can be reconstructed from the log.
pub mod audit;

#[allow(unused_imports)]
pub use error::*;
#[allow(unused_imports)]
pub use record::*;
#[allow(unused_imports)]
pub use signature::*;

pub use canonical::canonicalize;
pub use config::{ProofBundle, ProofConfig};
pub use controller::{DisplayState, Event, ProofStatus, ResetControl, StatusController};
pub use digest::{DigestEngine, DisplayDigest, Sha256Engine};

pub mod reexports {
    pub use {hex, log, thiserror};
}
