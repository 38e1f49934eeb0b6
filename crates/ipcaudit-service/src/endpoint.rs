//! Connection boundary: bind authorization and send handles.

use std::sync::Arc;

use ipcaudit_capture::IdentityRegistry;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::RecorderConfig;
use crate::message::{Command, ControlMessage, ReplySender};
use crate::recorder::{run, Recorder};
use crate::store::LogStore;

/// Callers with a numeric identity at or above this value are
/// unprivileged applications and may not bind, unless they are the
/// recorder's own process.
pub const RESERVED_IDENTITY_CEILING: i32 = 10_000;

/// The recorder worker is gone and the message was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("recorder control channel is closed")]
pub struct ChannelClosed;

/// The bindable surface of a running recorder.
pub struct RecorderEndpoint {
    sender: mpsc::UnboundedSender<ControlMessage>,
    own_uid: i32,
}

impl RecorderEndpoint {
    /// Wrap a control channel sender with the bind guard.
    pub fn new(sender: mpsc::UnboundedSender<ControlMessage>, own_uid: i32) -> Self {
        Self { sender, own_uid }
    }

    /// Accept or refuse a connection from `caller_uid`.
    ///
    /// System identities (below the reserved ceiling) and the
    /// recorder's own process get a handle; everyone else gets nothing.
    pub fn bind(&self, caller_uid: i32) -> Option<RecorderHandle> {
        info!(caller_uid, "received bind request");
        if caller_uid < RESERVED_IDENTITY_CEILING || caller_uid == self.own_uid {
            Some(RecorderHandle {
                sender: self.sender.clone(),
            })
        } else {
            None
        }
    }
}

/// A bound connection to the recorder worker.
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    sender: mpsc::UnboundedSender<ControlMessage>,
}

impl RecorderHandle {
    /// Enqueue a command with no reply channel.
    pub fn send(&self, command: Command) -> Result<(), ChannelClosed> {
        self.send_message(ControlMessage::new(command))
    }

    /// Enqueue a command carrying a reply channel.
    pub fn send_with_reply(
        &self,
        command: Command,
        reply_to: ReplySender,
    ) -> Result<(), ChannelClosed> {
        self.send_message(ControlMessage::with_reply(command, reply_to))
    }

    /// Enqueue a prebuilt message.
    pub fn send_message(&self, message: ControlMessage) -> Result<(), ChannelClosed> {
        self.sender.send(message).map_err(|_| ChannelClosed)
    }
}

/// Start a recorder worker, returning its endpoint and the worker task.
pub fn spawn(
    config: RecorderConfig,
    registry: Arc<dyn IdentityRegistry>,
    store: Arc<dyn LogStore>,
) -> (RecorderEndpoint, JoinHandle<()>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let own_uid = config.own_uid;
    let recorder = Recorder::new(config, registry, store);
    let worker = tokio::spawn(run(recorder, receiver));
    (RecorderEndpoint::new(sender, own_uid), worker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> RecorderEndpoint {
        let (sender, _receiver) = mpsc::unbounded_channel();
        RecorderEndpoint::new(sender, 1000)
    }

    #[test]
    fn system_identities_may_bind() {
        assert!(endpoint().bind(0).is_some());
        assert!(endpoint().bind(2000).is_some());
        assert!(endpoint().bind(9_999).is_some());
    }

    #[test]
    fn own_process_may_bind() {
        assert!(endpoint().bind(1000).is_some());

        let (sender, _receiver) = mpsc::unbounded_channel();
        let own = RecorderEndpoint::new(sender, 10_123);
        assert!(own.bind(10_123).is_some());
    }

    #[test]
    fn unprivileged_identities_are_refused() {
        assert!(endpoint().bind(10_000).is_none());
        assert!(endpoint().bind(10_123).is_none());
    }

    #[test]
    fn send_fails_once_the_worker_is_gone() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let endpoint = RecorderEndpoint::new(sender, 1000);
        let handle = endpoint.bind(0).expect("bind");
        drop(receiver);
        assert_eq!(handle.send(Command::StartLogging), Err(ChannelClosed));
    }
}
