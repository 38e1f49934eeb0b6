//! Capture session state.

use ipcaudit_format::{AuditLog, EventRecord, FormatVersion};

/// Process-wide capture state, owned by the recorder worker and never
/// touched from anywhere else.
///
/// The record count is always derived from the resident log, so it
/// cannot drift from the log's contents.
#[derive(Debug, Default)]
pub struct CaptureState {
    active: bool,
    log: Option<AuditLog>,
}

impl CaptureState {
    /// Whether capture events are currently being recorded.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The accumulated log, if a session has ever started.
    pub fn log(&self) -> Option<&AuditLog> {
        self.log.as_ref()
    }

    /// Records in the current log, 0 when no log exists.
    pub fn record_count(&self) -> u32 {
        self.log.as_ref().map(AuditLog::count).unwrap_or(0)
    }

    /// Start a fresh session: replace the log and activate capture.
    pub(crate) fn begin(&mut self, version: FormatVersion) {
        self.log = Some(AuditLog::new(version));
        self.active = true;
    }

    /// Halt capture. The accumulated log stays resident and saveable.
    pub(crate) fn halt(&mut self) {
        self.active = false;
    }

    /// Append a record to the current log, if one exists.
    pub(crate) fn append(&mut self, record: EventRecord) {
        if let Some(log) = self.log.as_mut() {
            log.append(record);
        }
    }
}
