//! Control protocol messages.

use ipcaudit_capture::CaptureRequest;
use tokio::sync::mpsc;

/// Wire command codes, shared with controllers and the interception
/// mechanism.
pub mod codes {
    /// Capture event notification.
    pub const CHECK_INTENT: i32 = 1;
    /// Start a new capture session.
    pub const START_LOGGING: i32 = 2;
    /// Halt the current capture session.
    pub const STOP_LOGGING: i32 = 3;
    /// Query the current record count.
    pub const GET_COUNT: i32 = 4;
    /// Persist the accumulated log.
    pub const SAVE_LOG: i32 = 5;
}

/// Reply channel attached to a control message.
pub type ReplySender = mpsc::UnboundedSender<ControlMessage>;

/// Command payload of a control message.
#[derive(Debug, Clone)]
pub enum Command {
    /// An intercepted IPC event to consider for recording.
    CheckIntent(CaptureRequest),
    /// Start a new capture session.
    StartLogging,
    /// Halt the current capture session.
    StopLogging,
    /// Query the current record count.
    GetCount,
    /// Persist the accumulated log.
    SaveLog,
    /// Response to [`Command::GetCount`].
    Count(u32),
    /// A command code this recorder does not understand.
    Other(i32),
}

impl Command {
    /// The wire code for this command.
    pub fn code(&self) -> i32 {
        match self {
            Self::CheckIntent(_) => codes::CHECK_INTENT,
            Self::StartLogging => codes::START_LOGGING,
            Self::StopLogging => codes::STOP_LOGGING,
            Self::GetCount | Self::Count(_) => codes::GET_COUNT,
            Self::SaveLog => codes::SAVE_LOG,
            Self::Other(code) => *code,
        }
    }
}

/// One message on the recorder's control channel.
#[derive(Debug, Clone)]
pub struct ControlMessage {
    /// The command to dispatch on.
    pub command: Command,
    /// Return path for acknowledgments and query responses.
    pub reply_to: Option<ReplySender>,
}

impl ControlMessage {
    /// A message with no reply channel.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            reply_to: None,
        }
    }

    /// A message carrying a reply channel.
    pub fn with_reply(command: Command, reply_to: ReplySender) -> Self {
        Self {
            command,
            reply_to: Some(reply_to),
        }
    }
}
