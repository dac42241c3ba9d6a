//! Test helper capturing audit events as JSON.

use super::AUDIT_TARGET;
use std::io;
use std::sync::{Arc, Mutex};

/// Collects the JSON lines written by a `tracing_subscriber::fmt` layer.
#[derive(Clone, Default)]
pub(crate) struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl CapturedLog {
    /// Audit events recorded so far, in order.
    pub(crate) fn audit_events(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
            .filter(|event| event["target"] == AUDIT_TARGET)
            .collect()
    }

    pub(crate) fn count(&self, event_type: &str) -> usize {
        self.audit_events()
            .iter()
            .filter(|event| event["event_type"] == event_type)
            .count()
    }
}

/// Run `f` with audit events captured on this thread only.
pub(crate) fn with_captured_audit<T>(f: impl FnOnce() -> T) -> (T, CapturedLog) {
    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_target(true)
        .with_writer(log.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, log)
}
