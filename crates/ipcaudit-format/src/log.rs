//! The audit log container: a version header plus an insertion-ordered
//! record sequence.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::record::EventRecord;
use crate::version::FormatVersion;
use crate::wire::{self, DecodeError};

/// Format marker at the start of every serialized log.
pub const MAGIC: [u8; 4] = *b"IPCA";

/// An in-memory audit log.
///
/// Pure data plus encoding: the container knows nothing about capture
/// state. Appending never fails, and serializing twice without an
/// intervening append yields byte-identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    version: FormatVersion,
    records: Vec<EventRecord>,
}

impl AuditLog {
    /// Create an empty log stamped with `version`.
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            records: Vec::new(),
        }
    }

    /// The version captured when this log was created.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Append a record at the end of the log.
    pub fn append(&mut self, record: EventRecord) {
        self.records.push(record);
    }

    /// Number of records in the log.
    pub fn count(&self) -> u32 {
        self.records.len() as u32
    }

    /// The records, in insertion order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Serialize the whole log: magic, version, record count, then each
    /// record in insertion order.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        self.version.encode(&mut buf);
        buf.put_u32(self.count());
        for record in &self.records {
            record.encode(&mut buf);
        }
        buf.freeze()
    }

    /// Decode a serialized log produced by [`AuditLog::to_bytes`].
    pub fn from_bytes(input: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = Bytes::copy_from_slice(input);

        wire::ensure(&buf, MAGIC.len())?;
        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }

        let version = FormatVersion::decode(&mut buf)?;
        let count = wire::get_u32(&mut buf)?;
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            records.push(EventRecord::decode(&mut buf)?);
        }
        Ok(Self { version, records })
    }
}
