//! Periodic count polling tied to host visibility.

use std::time::Duration;

use ipcaudit_service::{Command, RecorderHandle, ReplySender};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::warn;

/// Default polling rate for the live counter.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Controls whether an attached [`CountPoller`] is polling.
///
/// Hosts flip this on visibility transitions; polling stops while the
/// host is hidden and re-synchronizes immediately when it reappears.
#[derive(Debug)]
pub struct VisibilityGate {
    sender: watch::Sender<bool>,
}

impl VisibilityGate {
    /// Create a gate (initially visible) and the receiver a poller
    /// watches.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (sender, receiver) = watch::channel(true);
        (Self { sender }, receiver)
    }

    /// Report a visibility transition.
    pub fn set_visible(&self, visible: bool) {
        let _ = self.sender.send(visible);
    }
}

/// Best-effort, lossy poll of the recorder's record count.
///
/// One request per tick; replies are delivered to the caller's
/// callback. No delivery guarantee beyond eventually reflecting state.
pub struct CountPoller {
    handle: RecorderHandle,
    visibility: watch::Receiver<bool>,
    poll_interval: Duration,
}

impl CountPoller {
    /// Create a poller at the default rate.
    pub fn new(handle: RecorderHandle, visibility: watch::Receiver<bool>) -> Self {
        Self::with_interval(handle, visibility, POLL_INTERVAL)
    }

    /// Create a poller at a custom rate.
    pub fn with_interval(
        handle: RecorderHandle,
        visibility: watch::Receiver<bool>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            handle,
            visibility,
            poll_interval,
        }
    }

    /// Poll until the recorder or the gate goes away, reporting each
    /// count to `on_count`.
    pub async fn run(self, mut on_count: impl FnMut(u32)) {
        let Self {
            handle,
            mut visibility,
            poll_interval,
        } = self;
        let (reply, mut replies) = mpsc::unbounded_channel();
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if !*visibility.borrow_and_update() {
                // Hidden: no polling until the host reappears.
                if visibility.changed().await.is_err() {
                    break;
                }
                if *visibility.borrow_and_update() {
                    // Re-synchronize immediately on resume.
                    poll(&handle, &reply);
                    ticker.reset();
                }
                continue;
            }

            tokio::select! {
                _ = ticker.tick() => poll(&handle, &reply),
                received = replies.recv() => match received {
                    Some(message) => {
                        if let Command::Count(count) = message.command {
                            on_count(count);
                        }
                    }
                    None => break,
                },
                changed = visibility.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

fn poll(handle: &RecorderHandle, reply: &ReplySender) {
    if handle
        .send_with_reply(Command::GetCount, reply.clone())
        .is_err()
    {
        warn!("failed to poll recorder for count");
    }
}
