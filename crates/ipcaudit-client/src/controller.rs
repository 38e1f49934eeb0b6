//! Fire-and-forget control commands.

use ipcaudit_service::{Command, RecorderHandle, ReplySender};
use tracing::warn;

/// A controller's view of a bound recorder.
///
/// All sends are fire-and-forget: a dead recorder is logged, not
/// surfaced, matching the control protocol's delivery guarantees.
#[derive(Debug, Clone)]
pub struct Controller {
    handle: RecorderHandle,
}

impl Controller {
    /// Wrap a bound handle.
    pub fn new(handle: RecorderHandle) -> Self {
        Self { handle }
    }

    /// Start a new capture session.
    pub fn start_capture(&self) {
        if self.handle.send(Command::StartLogging).is_err() {
            warn!("failed to send message to recorder");
        }
    }

    /// Halt the current capture session.
    pub fn stop_capture(&self) {
        if self.handle.send(Command::StopLogging).is_err() {
            warn!("failed to send message to recorder");
        }
    }

    /// Ask the recorder to persist the accumulated log.
    pub fn save_log(&self) {
        if self.handle.send(Command::SaveLog).is_err() {
            warn!("failed to send message to recorder");
        }
    }

    /// Request the current record count on `reply_to`.
    pub fn request_count(&self, reply_to: ReplySender) {
        if self
            .handle
            .send_with_reply(Command::GetCount, reply_to)
            .is_err()
        {
            warn!("failed to send message to recorder");
        }
    }

    /// The underlying handle.
    pub fn handle(&self) -> &RecorderHandle {
        &self.handle
    }
}
