//! The verify/tamper state machine.
//!
//! A [`StatusController`] owns the live record. Every edit or reset goes
//! through the same recomputation step, which is the only place the
//! verification flag is written:
//!
//! ```text
//! edit / reset ──► canonicalize ──► KeyMaterial::verify ──► DisplayState
//!                        └────────► DigestEngine ───────────┘
//! ```
//!
//! Handlers take `&mut self`, so events are applied one at a time and run to
//! completion. Digest computation can be deferred with [`StatusController::dispatch`]
//! and landed later with [`StatusController::complete_digest`]; results for
//! superseded requests are dropped.

use crate::audit;
use crate::canonical::{canonicalize, separator_collisions};
use crate::config::ProofConfig;
use crate::digest::{
    DigestEngine, DigestRequest, DigestSlot, DigestTicket, DisplayDigest, Sha256Engine,
};
use crate::error::PMError;
use crate::record::{Field, OriginalRecord, ProofRecord};
use crate::signature::KeyMaterial;

use log::*;
use std::fmt;

/// Verification status of the live record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofStatus {
    Verified,
    Tampered,
}

impl ProofStatus {
    pub fn from_verified(verified: bool) -> Self {
        if verified {
            ProofStatus::Verified
        } else {
            ProofStatus::Tampered
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProofStatus::Verified => "verified",
            ProofStatus::Tampered => "tampered",
        }
    }
}

impl fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of the reset control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetControl {
    Hidden,
    Visible,
}

/// What the user sees. Derived from the live record, never stored elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub digest: DisplayDigest,
    pub verified: bool,
    /// Fields whose value contains the canonical separator.
    pub ambiguous_fields: Vec<Field>,
}

impl DisplayState {
    pub fn status(&self) -> ProofStatus {
        ProofStatus::from_verified(self.verified)
    }

    pub fn status_text(&self) -> &'static str {
        match self.status() {
            ProofStatus::Verified => "✓ Verified",
            ProofStatus::Tampered => "✗ TAMPERED!",
        }
    }

    /// Style class of the status region.
    pub fn status_class(&self) -> &'static str {
        match self.status() {
            ProofStatus::Verified => "verified",
            ProofStatus::Tampered => "failed",
        }
    }

    /// The reset control is only offered while tampered.
    pub fn reset_control(&self) -> ResetControl {
        match self.status() {
            ProofStatus::Verified => ResetControl::Hidden,
            ProofStatus::Tampered => ResetControl::Visible,
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.digest, self.status_text())
    }
}

/// Input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    FieldEdited { field: Field, value: String },
    ResetRequested,
}

impl Event {
    pub fn edit(field: Field, value: impl Into<String>) -> Self {
        Event::FieldEdited {
            field,
            value: value.into(),
        }
    }
}

/// Owns the live record and keeps its [`DisplayState`] in sync.
pub struct StatusController<E: DigestEngine = Sha256Engine> {
    keys: KeyMaterial,
    original: OriginalRecord,
    current: ProofRecord,
    engine: E,
    digest_slot: DigestSlot,
    display: DisplayState,
    session_id: String,
}

impl StatusController<Sha256Engine> {
    /// Start a session with the default SHA-256 display digest.
    pub fn new(config: ProofConfig) -> Result<Self, PMError> {
        Self::with_engine(config, Sha256Engine)
    }
}

impl<E: DigestEngine> StatusController<E> {
    /// Start a session with a custom digest engine.
    ///
    /// The original record must verify against the configured key material;
    /// otherwise no valid session exists and [`PMError::SelfTestFailed`] is returned.
    pub fn with_engine(config: ProofConfig, engine: E) -> Result<Self, PMError> {
        let ProofConfig { keys, original } = config;
        let mut controller = Self {
            keys,
            current: original.to_record(),
            original,
            engine,
            digest_slot: DigestSlot::new(),
            display: DisplayState::default(),
            session_id: audit::new_session_id(),
        };
        let request = controller.reverify();
        controller.land(request);

        let passed = controller.display.verified;
        audit::log_self_test(
            &controller.session_id,
            controller.display.digest.as_str(),
            passed,
        );
        if !passed {
            return Err(PMError::SelfTestFailed);
        }
        debug!(
            "Session {} started in state [{}]",
            controller.session_id,
            controller.status()
        );
        Ok(controller)
    }

    /// Apply an edit to one field and recompute.
    pub fn on_field_edit(&mut self, field: Field, value: impl Into<String>) -> &DisplayState {
        self.apply_edit(field, value.into());
        self.recompute()
    }

    /// Restore the original record and recompute.
    pub fn on_reset(&mut self) -> &DisplayState {
        self.apply_reset();
        self.recompute()
    }

    /// Apply an event and recompute synchronously.
    pub fn handle(&mut self, event: Event) -> &DisplayState {
        match event {
            Event::FieldEdited { field, value } => self.on_field_edit(field, value),
            Event::ResetRequested => self.on_reset(),
        }
    }

    /// Apply an event, leaving the digest to the caller.
    ///
    /// Verification is recomputed before this returns; the display digest is
    /// `Pending` until the returned request is passed to [`Self::complete_digest`].
    pub fn dispatch(&mut self, event: Event) -> DigestRequest {
        match event {
            Event::FieldEdited { field, value } => self.apply_edit(field, value),
            Event::ResetRequested => self.apply_reset(),
        }
        self.refresh()
    }

    /// Land a deferred digest.
    ///
    /// Returns `false` and leaves the display untouched when a newer request
    /// has been issued since `ticket`.
    pub fn complete_digest(
        &mut self,
        ticket: DigestTicket,
        result: Result<[u8; 32], PMError>,
    ) -> bool {
        if !self.digest_slot.is_current(ticket) {
            debug!(
                "Dropping stale digest for request {} (latest is newer)",
                ticket.generation()
            );
            return false;
        }
        if let Err(e) = &result {
            warn!("Display digest unavailable: {e}");
            audit::log_digest_unavailable(&self.session_id, &e.to_string());
        }
        self.display.digest = DisplayDigest::from_result(result);
        true
    }

    /// Recompute the display state from the live record.
    ///
    /// Idempotent: with no edit in between, two calls produce equal states.
    pub fn recompute(&mut self) -> &DisplayState {
        let request = self.refresh();
        self.land(request)
    }

    /// Re-verify the live record, auditing any status change.
    fn refresh(&mut self) -> DigestRequest {
        let previous = self.display.status();
        let request = self.reverify();
        let status = self.display.status();
        if status != previous {
            audit::log_transition(&self.session_id, previous.as_str(), status.as_str());
        }
        request
    }

    /// The only writer of `display.verified`. Issues a new digest request.
    fn reverify(&mut self) -> DigestRequest {
        let message = canonicalize(&self.current);
        self.display.verified = self.keys.verify(&message);
        self.display.ambiguous_fields = separator_collisions(&self.current);
        self.display.digest = DisplayDigest::Pending;
        DigestRequest::new(self.digest_slot.issue(), message)
    }

    /// Compute a digest with the controller's own engine and land it.
    fn land(&mut self, request: DigestRequest) -> &DisplayState {
        let result = request.compute(&self.engine);
        self.complete_digest(request.ticket(), result);
        &self.display
    }

    fn apply_edit(&mut self, field: Field, value: String) {
        if value.contains(crate::canonical::SEPARATOR) {
            warn!(
                "Field [{field}] contains the separator '{}'; canonical encoding is ambiguous",
                crate::canonical::SEPARATOR
            );
        }
        debug!("Edit [{field}] = {value:?}");
        self.current.set(field, value);
    }

    fn apply_reset(&mut self) {
        audit::log_reset(&self.session_id, self.status().as_str());
        self.current = self.original.to_record();
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn status(&self) -> ProofStatus {
        self.display.status()
    }

    pub fn record(&self) -> &ProofRecord {
        &self.current
    }

    pub fn original(&self) -> &OriginalRecord {
        &self.original
    }

    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl<E: DigestEngine> fmt::Debug for StatusController<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusController")
            .field("session_id", &self.session_id)
            .field("record", &self.current)
            .field("display", &self.display)
            .finish()
    }
}
