//! Log format version, captured from the host platform release string.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::wire::{self, DecodeError};

/// Version stamp stored in the log header.
///
/// Captured once when a capture session starts and immutable for the
/// lifetime of that log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatVersion {
    /// Major platform version.
    pub major: u16,
    /// Minor platform version.
    pub minor: u8,
    /// Patch platform version.
    pub patch: u8,
}

impl FormatVersion {
    /// Create a version from its components.
    pub fn new(major: u16, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a host release string such as `"7.1.2"`.
    ///
    /// Splits on `.` and accepts one to three numeric components. A
    /// two-component string maps to patch 1, matching the recorder this
    /// format originated with; changing it would fork existing logs.
    /// Any parse failure, or more than three components, falls back to
    /// the all-zero version.
    pub fn parse(release: &str) -> Self {
        let parts: Vec<&str> = release.split('.').collect();
        let parsed = match parts.as_slice() {
            [major] => major.parse().map(|major| Self::new(major, 0, 0)),
            [major, minor] => major
                .parse()
                .and_then(|major| minor.parse().map(|minor| Self::new(major, minor, 1))),
            [major, minor, patch] => major.parse().and_then(|major| {
                minor.parse().and_then(|minor| {
                    patch.parse().map(|patch| Self::new(major, minor, patch))
                })
            }),
            _ => {
                warn!(release, "unexpected host version shape");
                return Self::default();
            }
        };
        parsed.unwrap_or_else(|_| {
            warn!(release, "failed to parse host version");
            Self::default()
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.major);
        buf.put_u8(self.minor);
        buf.put_u8(self.patch);
    }

    pub(crate) fn decode(buf: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(Self {
            major: wire::get_u16(buf)?,
            minor: wire::get_u8(buf)?,
            patch: wire::get_u8(buf)?,
        })
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
