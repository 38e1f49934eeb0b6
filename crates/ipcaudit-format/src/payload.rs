//! Common message payload embedded in every record.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::wire::{self, DecodeError};

/// The payload of the underlying IPC message, shared by all record
/// variants.
///
/// `categories` is the declaration-ordered category list joined with
/// `;`, empty when the message carried none. `clip_data` and `extras`
/// are opaque marshalled blobs; an empty blob means the message carried
/// none or extraction failed upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentData {
    /// Action string, if the message declared one.
    pub action: Option<String>,
    /// URI-like data reference.
    pub data: Option<String>,
    /// Message flags.
    pub flags: u32,
    /// Declared MIME type.
    pub mime_type: Option<String>,
    /// `;`-joined category list.
    pub categories: String,
    /// Opaque clip-data blob.
    pub clip_data: Vec<u8>,
    /// Opaque extras blob.
    pub extras: Vec<u8>,
}

impl IntentData {
    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        wire::put_opt_string(buf, self.action.as_deref());
        wire::put_opt_string(buf, self.data.as_deref());
        buf.put_u32(self.flags);
        wire::put_opt_string(buf, self.mime_type.as_deref());
        wire::put_string(buf, &self.categories);
        wire::put_blob(buf, &self.clip_data);
        wire::put_blob(buf, &self.extras);
    }

    pub(crate) fn decode(buf: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(Self {
            action: wire::get_opt_string(buf)?,
            data: wire::get_opt_string(buf)?,
            flags: wire::get_u32(buf)?,
            mime_type: wire::get_opt_string(buf)?,
            categories: wire::get_string(buf)?,
            clip_data: wire::get_blob(buf)?,
            extras: wire::get_blob(buf)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_all_fields() {
        let payload = IntentData {
            action: Some("android.intent.action.VIEW".into()),
            data: Some("content://contacts/1".into()),
            flags: 0x1000_0000,
            mime_type: Some("text/plain".into()),
            categories: "DEFAULT;BROWSABLE".into(),
            clip_data: vec![1, 2, 3],
            extras: vec![9, 8],
        };

        let mut buf = BytesMut::new();
        payload.encode(&mut buf);
        let mut bytes = buf.freeze();
        assert_eq!(IntentData::decode(&mut bytes).unwrap(), payload);
        assert!(bytes.is_empty());
    }

    #[test]
    fn round_trips_defaults() {
        let payload = IntentData::default();
        let mut buf = BytesMut::new();
        payload.encode(&mut buf);
        let mut bytes = buf.freeze();
        assert_eq!(IntentData::decode(&mut bytes).unwrap(), payload);
    }

    #[test]
    fn absent_action_differs_from_empty_action() {
        let absent = IntentData::default();
        let empty = IntentData {
            action: Some(String::new()),
            ..IntentData::default()
        };

        let mut a = BytesMut::new();
        let mut b = BytesMut::new();
        absent.encode(&mut a);
        empty.encode(&mut b);
        assert_ne!(a, b);
    }
}
