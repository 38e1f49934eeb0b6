//! Binary audit-log container format for IpcAudit.
//!
//! A log is a versioned, insertion-ordered sequence of heterogeneous,
//! tagged records, each describing one intercepted IPC event. The format
//! is big-endian throughout and every record carries a total-length
//! prefix so readers of a different minor version can skip records they
//! do not understand.

mod log;
mod payload;
mod record;
mod version;
mod wire;

pub use log::{AuditLog, MAGIC};
pub use payload::IntentData;
pub use record::{BroadcastRecord, EventRecord, LaunchRecord, ServiceRecord};
pub use version::FormatVersion;
pub use wire::DecodeError;
