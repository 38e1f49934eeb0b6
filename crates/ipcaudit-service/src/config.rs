//! Recorder configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a recorder worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Host platform release string, parsed into the log's format
    /// version each time a capture session starts.
    pub host_version: String,
    /// Numeric identity of the recorder's own process, used by the
    /// bind guard.
    pub own_uid: i32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            host_version: String::new(),
            own_uid: 1000,
        }
    }
}
