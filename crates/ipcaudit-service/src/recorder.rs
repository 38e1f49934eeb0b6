//! The capture state machine and its worker loop.

use std::sync::Arc;

use ipcaudit_capture::{Classifier, IdentityRegistry, Rejection};
use ipcaudit_format::FormatVersion;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::RecorderConfig;
use crate::message::{Command, ControlMessage};
use crate::state::CaptureState;
use crate::store::LogStore;

/// The recorder: capture state plus the collaborators that feed and
/// drain it. All mutation happens through [`Recorder::handle`], which
/// the worker calls one message at a time.
pub struct Recorder {
    config: RecorderConfig,
    state: CaptureState,
    classifier: Classifier,
    store: Arc<dyn LogStore>,
}

impl Recorder {
    /// Create an idle recorder.
    pub fn new(
        config: RecorderConfig,
        registry: Arc<dyn IdentityRegistry>,
        store: Arc<dyn LogStore>,
    ) -> Self {
        Self {
            config,
            state: CaptureState::default(),
            classifier: Classifier::new(registry),
            store,
        }
    }

    /// Current capture state.
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Dispatch one control message.
    pub fn handle(&mut self, message: ControlMessage) {
        match &message.command {
            Command::CheckIntent(_) => self.check_intent(message),
            Command::StartLogging => self.start_logging(),
            Command::StopLogging => {
                info!("disabling capture");
                self.state.halt();
            }
            Command::GetCount => self.send_count(&message),
            Command::SaveLog => self.save_log(),
            Command::Count(_) | Command::Other(_) => {
                debug!(code = message.command.code(), "ignoring message");
            }
        }
    }

    fn start_logging(&mut self) {
        info!("enabling capture");
        let version = FormatVersion::parse(&self.config.host_version);
        self.state.begin(version);
    }

    fn check_intent(&mut self, message: ControlMessage) {
        if let Command::CheckIntent(request) = &message.command {
            if self.state.is_active() && self.state.log().is_some() {
                match self.classifier.classify(request) {
                    Ok(record) => self.state.append(record),
                    Err(Rejection::MissingPayload) => {
                        warn!("failed to record event, no message");
                    }
                    Err(Rejection::UnknownKind(kind)) => {
                        debug!(kind, "dropping event of unknown kind");
                    }
                }
            }
        }

        // Echo the event back so the interception mechanism knows it was
        // observed and may let the IPC proceed.
        if let Some(reply_to) = &message.reply_to {
            if reply_to.send(message.clone()).is_err() {
                warn!("failed to acknowledge capture event");
            }
        }
    }

    fn send_count(&self, message: &ControlMessage) {
        let Some(reply_to) = &message.reply_to else {
            return;
        };
        let count = self.state.record_count();
        let response = ControlMessage::new(Command::Count(count));
        if reply_to.send(response).is_err() {
            warn!("failed to send record count");
        }
    }

    fn save_log(&self) {
        let Some(log) = self.state.log() else {
            debug!("no log to save");
            return;
        };
        info!(records = log.count(), "saving log");
        match self.store.write(&log.to_bytes()) {
            Ok(path) => info!(path = %path.display(), "log saved"),
            Err(error) => error!(%error, "failed to save log"),
        }
    }
}

/// Drain the control channel until every sender is gone, handling one
/// message at a time in arrival order.
pub async fn run(mut recorder: Recorder, mut receiver: mpsc::UnboundedReceiver<ControlMessage>) {
    while let Some(message) = receiver.recv().await {
        recorder.handle(message);
    }
    debug!("control channel closed, recorder worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryLogStore, StoreError};
    use ipcaudit_capture::{
        CaptureRequest, EventFields, EventKind, IntentMessage, NullRegistry, StaticRegistry,
    };
    use ipcaudit_format::AuditLog;
    use std::path::PathBuf;

    fn recorder_with_store(store: Arc<dyn LogStore>) -> Recorder {
        Recorder::new(
            RecorderConfig {
                host_version: "7.1.2".into(),
                own_uid: 1000,
            },
            Arc::new(StaticRegistry::new().insert("com.example", 10_050)),
            store,
        )
    }

    fn recorder() -> Recorder {
        recorder_with_store(Arc::new(MemoryLogStore::new()))
    }

    fn launch_event() -> ControlMessage {
        ControlMessage::new(Command::CheckIntent(CaptureRequest::new(
            EventKind::Launch,
            EventFields::default(),
            IntentMessage {
                action: Some("MAIN".into()),
                ..IntentMessage::default()
            },
        )))
    }

    #[test]
    fn events_are_dropped_while_idle() {
        let mut recorder = recorder();
        recorder.handle(launch_event());
        assert_eq!(recorder.state().record_count(), 0);
        assert!(recorder.state().log().is_none());
    }

    #[test]
    fn start_capture_stamps_the_host_version() {
        let mut recorder = recorder();
        recorder.handle(ControlMessage::new(Command::StartLogging));
        assert!(recorder.state().is_active());
        assert_eq!(
            recorder.state().log().map(AuditLog::version),
            Some(FormatVersion::new(7, 1, 2))
        );
    }

    #[test]
    fn events_are_recorded_while_active() {
        let mut recorder = recorder();
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        recorder.handle(launch_event());
        assert_eq!(recorder.state().record_count(), 2);
    }

    #[test]
    fn stop_retains_the_log_and_drops_new_events() {
        let mut recorder = recorder();
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        recorder.handle(ControlMessage::new(Command::StopLogging));
        recorder.handle(launch_event());
        assert_eq!(recorder.state().record_count(), 1);
        assert!(!recorder.state().is_active());
    }

    #[test]
    fn restart_replaces_the_log() {
        let mut recorder = recorder();
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        recorder.handle(ControlMessage::new(Command::StopLogging));
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        recorder.handle(launch_event());
        assert_eq!(recorder.state().record_count(), 2);
    }

    #[test]
    fn malformed_events_do_not_stall_capture() {
        let mut recorder = recorder();
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(ControlMessage::new(Command::CheckIntent(CaptureRequest {
            kind: 0,
            fields: EventFields::default(),
            intent: None,
        })));
        recorder.handle(ControlMessage::new(Command::CheckIntent(CaptureRequest {
            kind: 99,
            fields: EventFields::default(),
            intent: Some(IntentMessage::default()),
        })));
        assert_eq!(recorder.state().record_count(), 0);

        recorder.handle(launch_event());
        assert_eq!(recorder.state().record_count(), 1);
    }

    #[test]
    fn save_hands_serialized_log_to_the_store() {
        let store = Arc::new(MemoryLogStore::new());
        let mut recorder = recorder_with_store(store.clone());
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        recorder.handle(ControlMessage::new(Command::SaveLog));

        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        let decoded = AuditLog::from_bytes(&saved[0]).unwrap();
        assert_eq!(decoded.count(), 1);
        assert_eq!(decoded.version(), FormatVersion::new(7, 1, 2));
    }

    #[test]
    fn save_without_a_log_is_a_no_op() {
        let store = Arc::new(MemoryLogStore::new());
        let mut recorder = recorder_with_store(store.clone());
        recorder.handle(ControlMessage::new(Command::SaveLog));
        assert!(store.saved().is_empty());
    }

    #[test]
    fn save_after_stop_still_writes_the_log() {
        let store = Arc::new(MemoryLogStore::new());
        let mut recorder = recorder_with_store(store.clone());
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        recorder.handle(ControlMessage::new(Command::StopLogging));
        recorder.handle(ControlMessage::new(Command::SaveLog));
        assert_eq!(store.saved().len(), 1);
    }

    struct FailingStore;

    impl LogStore for FailingStore {
        fn write(&self, _bytes: &[u8]) -> Result<PathBuf, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn failed_save_keeps_the_log_for_retry() {
        let mut recorder = recorder_with_store(Arc::new(FailingStore));
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        recorder.handle(ControlMessage::new(Command::SaveLog));

        // Nothing cleared, nothing deactivated; a retry is just another
        // save command.
        assert!(recorder.state().is_active());
        assert_eq!(recorder.state().record_count(), 1);
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let mut recorder = recorder();
        recorder.handle(ControlMessage::new(Command::Other(99)));
        recorder.handle(ControlMessage::new(Command::Count(5)));
        assert_eq!(recorder.state().record_count(), 0);
        assert!(!recorder.state().is_active());
    }

    #[test]
    fn count_reply_without_channel_is_a_no_op() {
        let mut recorder = recorder();
        // Must not panic or send anywhere.
        recorder.handle(ControlMessage::new(Command::GetCount));
    }

    #[test]
    fn identity_failures_still_record() {
        let mut recorder = Recorder::new(
            RecorderConfig::default(),
            Arc::new(NullRegistry),
            Arc::new(MemoryLogStore::new()),
        );
        recorder.handle(ControlMessage::new(Command::StartLogging));
        recorder.handle(launch_event());
        assert_eq!(recorder.state().record_count(), 1);
    }
}
