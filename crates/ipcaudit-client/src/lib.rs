//! Controller-side client for the IpcAudit recorder.
//!
//! The recorder itself only answers messages; this crate packages the
//! behaviors a controlling host needs: fire-and-forget command senders
//! and a lossy count poller that follows the host's visibility
//! lifecycle.

mod controller;
mod poller;

pub use controller::Controller;
pub use poller::{CountPoller, VisibilityGate, POLL_INTERVAL};
