//! Audit logging for proof verification sessions.
//!
//! Every state change a user can observe is mirrored as a structured event on
//! the `proofmark::audit` tracing target.
//!
//! # Usage
//!
//! ```rust,ignore
//! use proofmark::audit::{self, AuditConfig, LogDestination};
//!
//! // Initialize audit logging (typically once at program start)
//! audit::init(AuditConfig {
//!     enabled: true,
//!     destination: LogDestination::Stderr,
//!     json_format: true,
//!     filter: "proofmark::audit=info".to_string(),
//! })?;
//! ```
//!
//! # Event Types
//!
//! - `startup.self_test` - Original record checked at session start
//! - `status.transition` - Status flipped between verified and tampered
//! - `status.reset` - Record restored to its original values
//! - `digest.unavailable` - Display digest could not be computed
//!
//! # JSON Output Example
//!
//! ```json
//! {
//!   "timestamp": "2026-01-04T20:00:00Z",
//!   "level": "WARN",
//!   "target": "proofmark::audit",
//!   "event_type": "status.transition",
//!   "session_id": "0b7c7a4e-...",
//!   "from": "verified",
//!   "to": "tampered"
//! }
//! ```

use crate::error::PMError;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

#[cfg(test)]
pub(crate) mod capture;

/// Audit log target.
pub const AUDIT_TARGET: &str = "proofmark::audit";

static AUDIT_INITIALIZED: OnceLock<bool> = OnceLock::new();

/// Audit log configuration
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Enable audit logging (default: true)
    pub enabled: bool,
    /// Log destination
    pub destination: LogDestination,
    /// Use JSON format (default: true)
    pub json_format: bool,
    /// Log level filter (default: "proofmark::audit=info")
    pub filter: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            destination: LogDestination::Stderr,
            json_format: true,
            filter: format!("{AUDIT_TARGET}=info"),
        }
    }
}

/// Audit log destination
#[derive(Debug, Clone, Default)]
pub enum LogDestination {
    Stdout,
    #[default]
    Stderr,
    /// Append to a file (path)
    File(String),
}

/// Initialize the audit logging subsystem.
///
/// Only the first call has an effect.
pub fn init(config: AuditConfig) -> Result<(), PMError> {
    if AUDIT_INITIALIZED.get().is_some() {
        return Ok(());
    }
    if !config.enabled {
        let _ = AUDIT_INITIALIZED.set(true);
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.json_format;

    match config.destination {
        LogDestination::Stdout => install(filter, json, std::io::stdout),
        LogDestination::Stderr => install(filter, json, std::io::stderr),
        LogDestination::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    PMError::InternalError(format!("Failed to open audit log '{}': {}", path, e))
                })?;
            install(filter, json, std::sync::Mutex::new(file))
        }
    }

    let _ = AUDIT_INITIALIZED.set(true);
    Ok(())
}

fn install<W>(filter: EnvFilter, json: bool, writer: W)
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::NONE)
                    .with_writer(writer),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(writer))
            .try_init()
    };
    if let Err(e) = result {
        log::debug!("Audit subscriber not installed: {e}");
    }
}

/// Generate a new session identifier used to correlate audit events.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Audit Event Functions
// ============================================================================

/// Log the startup self-test of the original record.
pub fn log_self_test(session_id: &str, digest: &str, passed: bool) {
    if passed {
        tracing::info!(
            target: AUDIT_TARGET,
            event_type = "startup.self_test",
            session_id = session_id,
            digest = digest,
            passed = true,
            "Original record verified"
        );
    } else {
        tracing::error!(
            target: AUDIT_TARGET,
            event_type = "startup.self_test",
            session_id = session_id,
            digest = digest,
            passed = false,
            "Original record does not verify"
        );
    }
}

/// Log a change of verification status.
pub fn log_transition(session_id: &str, from: &str, to: &str) {
    tracing::warn!(
        target: AUDIT_TARGET,
        event_type = "status.transition",
        session_id = session_id,
        from = from,
        to = to,
        "Verification status changed"
    );
}

/// Log a reset to the original record.
pub fn log_reset(session_id: &str, from: &str) {
    tracing::info!(
        target: AUDIT_TARGET,
        event_type = "status.reset",
        session_id = session_id,
        from = from,
        "Record reset to original values"
    );
}

/// Log a failed display digest computation.
pub fn log_digest_unavailable(session_id: &str, error_message: &str) {
    let safe_message = sanitize_error_message(error_message);

    tracing::warn!(
        target: AUDIT_TARGET,
        event_type = "digest.unavailable",
        session_id = session_id,
        error_message = %safe_message,
        "Display digest unavailable"
    );
}

/// Keep error messages short enough for a single log line.
fn sanitize_error_message(message: &str) -> String {
    let flattened = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() > 200 {
        let truncated: String = flattened.chars().take(197).collect();
        format!("{truncated}...")
    } else {
        flattened
    }
}
