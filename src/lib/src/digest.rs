//! Display digest of canonical record bytes.
//!
//! The display digest is a SHA-256 of the canonical encoding, shown to the user
//! in truncated form. It plays no part in deciding whether a record verifies.
//!
//! Digests may be computed off the event loop. Each request is tagged with a
//! [`DigestTicket`] from a [`DigestSlot`]; only the most recently issued ticket
//! is allowed to land, so a slow, older computation can never overwrite the
//! digest of a newer edit.

use crate::error::PMError;
use crate::signature::Hash;
use std::fmt;

/// Number of hex characters kept at each end of a truncated digest.
pub const DIGEST_EDGE_CHARS: usize = 8;

/// Shown instead of a digest when the hashing primitive failed.
pub const DIGEST_PLACEHOLDER: &str = "unavailable";

/// Shown while a deferred digest has not landed yet.
pub const DIGEST_PENDING: &str = "computing...";

/// A hashing primitive producing the display digest.
pub trait DigestEngine {
    fn digest(&self, message: &[u8]) -> Result<[u8; 32], PMError>;
}

/// SHA-256, the default display digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Engine;

impl DigestEngine for Sha256Engine {
    fn digest(&self, message: &[u8]) -> Result<[u8; 32], PMError> {
        let mut hasher = Hash::new();
        hasher.update(message);
        Ok(hasher.finalize())
    }
}

/// `first8...last8` of the lowercase hex digest.
pub fn truncate_digest(digest: &[u8; 32]) -> String {
    let hex = hex::encode(digest);
    format!(
        "{}...{}",
        &hex[..DIGEST_EDGE_CHARS],
        &hex[hex.len() - DIGEST_EDGE_CHARS..]
    )
}

/// The digest as it currently appears to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayDigest {
    #[default]
    Pending,
    Ready(String),
    Unavailable,
}

impl DisplayDigest {
    pub fn from_result(result: Result<[u8; 32], PMError>) -> Self {
        match result {
            Ok(digest) => DisplayDigest::Ready(truncate_digest(&digest)),
            Err(_) => DisplayDigest::Unavailable,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DisplayDigest::Pending => DIGEST_PENDING,
            DisplayDigest::Ready(digest) => digest,
            DisplayDigest::Unavailable => DIGEST_PLACEHOLDER,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DisplayDigest::Ready(_))
    }
}

impl fmt::Display for DisplayDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one digest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DigestTicket(u64);

impl DigestTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Issues tickets and decides which completions are still current.
#[derive(Debug, Default)]
pub struct DigestSlot {
    generation: u64,
}

impl DigestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every ticket issued before it.
    pub fn issue(&mut self) -> DigestTicket {
        self.generation += 1;
        DigestTicket(self.generation)
    }

    pub fn is_current(&self, ticket: DigestTicket) -> bool {
        ticket.0 == self.generation
    }
}

/// A digest computation handed to the caller.
///
/// Carries the canonical bytes to hash, so the computation needs no access to
/// the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRequest {
    ticket: DigestTicket,
    message: Vec<u8>,
}

impl DigestRequest {
    pub(crate) fn new(ticket: DigestTicket, message: Vec<u8>) -> Self {
        Self { ticket, message }
    }

    pub fn ticket(&self) -> DigestTicket {
        self.ticket
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Run the request against `engine`.
    pub fn compute(&self, engine: &impl DigestEngine) -> Result<[u8; 32], PMError> {
        engine.digest(&self.message)
    }
}
