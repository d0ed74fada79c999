//! Audit sink for security-relevant events. The gate only reports; storage
//! and shipping of audit records belong to the host.

use std::fmt;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEvent {
    /// A decision observed the no-auth override and granted access.
    NoAuthInUse,
    NoAuthEnabled,
    NoAuthDisabled,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::NoAuthInUse => "AFS_RunNoAuth",
            AuditEvent::NoAuthEnabled => "AFS_NoAuthEnbl",
            AuditEvent::NoAuthDisabled => "AFS_NoAuthDsbl",
        }
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

pub trait AuditSink: Send + Sync {
    /// `code` is 0 on success, otherwise the OS error of the attempt.
    fn record(&self, event: AuditEvent, code: i32);
}

/// Writes audit records as `tracing` events on target `cellguard::audit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, event: AuditEvent, code: i32) {
        if code == 0 {
            tracing::info!(target: "cellguard::audit", event = event.as_str(), code, "audit");
        } else {
            tracing::warn!(target: "cellguard::audit", event = event.as_str(), code, "audit");
        }
    }
}

/// Keeps every record in memory. Used by tests and by hosts that batch audit
/// output themselves.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<(AuditEvent, i32)>>,
}

impl RecordingAudit {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<(AuditEvent, i32)> { self.events.lock().clone() }

    pub fn count(&self, event: AuditEvent) -> usize {
        self.events.lock().iter().filter(|(e, _)| *e == event).count()
    }
}

impl AuditSink for RecordingAudit {
    fn record(&self, event: AuditEvent, code: i32) {
        self.events.lock().push((event, code));
    }
}
