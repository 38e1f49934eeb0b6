//! Tagged record variants for the three kinds of intercepted IPC events.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::payload::IntentData;
use crate::wire::{self, DecodeError};

/// A component-launch request (activity-style).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRecord {
    /// Short name of the calling component.
    pub caller_component: Option<String>,
    /// Short name of the receiving component.
    pub receiver_component: Option<String>,
    /// Request code supplied by the caller.
    pub request_code: i32,
    /// Start flags supplied by the caller.
    pub start_flags: i32,
    /// Platform user the request ran as.
    pub user_id: i32,
    /// Capture time, Unix seconds.
    pub timestamp: i32,
    /// Millisecond offset within `timestamp`, 0-999.
    pub offset_ms: i16,
    /// Numeric identity of the caller, 0 when unknown.
    pub caller_uid: i32,
    /// Process id of the caller, 0 when unknown.
    pub caller_pid: i32,
    /// Numeric identity of the receiver's owner, 0 when unresolved.
    pub receiver_uid: i32,
    /// The underlying message payload.
    pub intent: IntentData,
}

/// A broadcast dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastRecord {
    /// Short name of the receiving component.
    pub receiver_component: Option<String>,
    /// Request code supplied by the sender.
    pub request_code: i32,
    /// Permission the receiver must hold, if any.
    pub required_permission: Option<String>,
    /// Platform user the dispatch ran as.
    pub user_id: i32,
    /// Capture time, Unix seconds.
    pub timestamp: i32,
    /// Millisecond offset within `timestamp`, 0-999.
    pub offset_ms: i16,
    /// Numeric identity of the receiver's owner, 0 when unresolved.
    pub receiver_uid: i32,
    /// The underlying message payload.
    pub intent: IntentData,
}

/// A background-service request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Action override reported by the interception mechanism.
    pub action: Option<String>,
    /// Short name of the calling component.
    pub caller_component: Option<String>,
    /// Request flags.
    pub flags: i32,
    /// Short name of the receiving component.
    pub receiver_component: Option<String>,
    /// Platform user the request ran as.
    pub user_id: i32,
    /// Capture time, Unix seconds.
    pub timestamp: i32,
    /// Millisecond offset within `timestamp`, 0-999.
    pub offset_ms: i16,
    /// Numeric identity of the caller, 0 when unknown.
    pub caller_uid: i32,
    /// Process id of the caller, 0 when unknown.
    pub caller_pid: i32,
    /// Numeric identity of the receiver's owner, 0 when unresolved.
    pub receiver_uid: i32,
    /// The underlying message payload.
    pub intent: IntentData,
}

/// One encoded IPC event in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    /// Component-launch request.
    Launch(LaunchRecord),
    /// Broadcast dispatch.
    Broadcast(BroadcastRecord),
    /// Background-service request.
    Service(ServiceRecord),
}

const TAG_LAUNCH: u8 = 0;
const TAG_BROADCAST: u8 = 1;
const TAG_SERVICE: u8 = 2;

impl EventRecord {
    /// The variant tag written to the wire.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Launch(_) => TAG_LAUNCH,
            Self::Broadcast(_) => TAG_BROADCAST,
            Self::Service(_) => TAG_SERVICE,
        }
    }

    /// The common payload owned by this record.
    pub fn intent(&self) -> &IntentData {
        match self {
            Self::Launch(r) => &r.intent,
            Self::Broadcast(r) => &r.intent,
            Self::Service(r) => &r.intent,
        }
    }

    /// Append this record to `buf`: a `u32` total-length prefix, the
    /// variant tag, the variant fields in declaration order, then the
    /// payload.
    pub fn encode(&self, buf: &mut BytesMut) {
        let mut body = BytesMut::new();
        body.put_u8(self.tag());
        match self {
            Self::Launch(r) => r.encode_fields(&mut body),
            Self::Broadcast(r) => r.encode_fields(&mut body),
            Self::Service(r) => r.encode_fields(&mut body),
        }
        buf.put_u32(body.len() as u32);
        buf.put_slice(&body);
    }

    /// Decode one record from `buf`, consuming exactly the bytes its
    /// length prefix declares.
    pub fn decode(buf: &mut Bytes) -> Result<Self, DecodeError> {
        let declared = wire::get_u32(buf)? as usize;
        wire::ensure(buf, declared)?;
        let mut body = buf.split_to(declared);

        let record = match wire::get_u8(&mut body)? {
            TAG_LAUNCH => Self::Launch(LaunchRecord::decode_fields(&mut body)?),
            TAG_BROADCAST => Self::Broadcast(BroadcastRecord::decode_fields(&mut body)?),
            TAG_SERVICE => Self::Service(ServiceRecord::decode_fields(&mut body)?),
            tag => return Err(DecodeError::UnknownTag(tag)),
        };

        if !body.is_empty() {
            return Err(DecodeError::LengthMismatch {
                declared,
                consumed: declared - body.len(),
            });
        }
        Ok(record)
    }
}

impl LaunchRecord {
    fn encode_fields(&self, buf: &mut BytesMut) {
        wire::put_opt_string(buf, self.caller_component.as_deref());
        wire::put_opt_string(buf, self.receiver_component.as_deref());
        buf.put_i32(self.request_code);
        buf.put_i32(self.start_flags);
        buf.put_i32(self.user_id);
        buf.put_i32(self.timestamp);
        buf.put_i16(self.offset_ms);
        buf.put_i32(self.caller_uid);
        buf.put_i32(self.caller_pid);
        buf.put_i32(self.receiver_uid);
        self.intent.encode(buf);
    }

    fn decode_fields(buf: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(Self {
            caller_component: wire::get_opt_string(buf)?,
            receiver_component: wire::get_opt_string(buf)?,
            request_code: wire::get_i32(buf)?,
            start_flags: wire::get_i32(buf)?,
            user_id: wire::get_i32(buf)?,
            timestamp: wire::get_i32(buf)?,
            offset_ms: wire::get_i16(buf)?,
            caller_uid: wire::get_i32(buf)?,
            caller_pid: wire::get_i32(buf)?,
            receiver_uid: wire::get_i32(buf)?,
            intent: IntentData::decode(buf)?,
        })
    }
}

impl BroadcastRecord {
    fn encode_fields(&self, buf: &mut BytesMut) {
        wire::put_opt_string(buf, self.receiver_component.as_deref());
        buf.put_i32(self.request_code);
        wire::put_opt_string(buf, self.required_permission.as_deref());
        buf.put_i32(self.user_id);
        buf.put_i32(self.timestamp);
        buf.put_i16(self.offset_ms);
        buf.put_i32(self.receiver_uid);
        self.intent.encode(buf);
    }

    fn decode_fields(buf: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(Self {
            receiver_component: wire::get_opt_string(buf)?,
            request_code: wire::get_i32(buf)?,
            required_permission: wire::get_opt_string(buf)?,
            user_id: wire::get_i32(buf)?,
            timestamp: wire::get_i32(buf)?,
            offset_ms: wire::get_i16(buf)?,
            receiver_uid: wire::get_i32(buf)?,
            intent: IntentData::decode(buf)?,
        })
    }
}

impl ServiceRecord {
    fn encode_fields(&self, buf: &mut BytesMut) {
        wire::put_opt_string(buf, self.action.as_deref());
        wire::put_opt_string(buf, self.caller_component.as_deref());
        buf.put_i32(self.flags);
        wire::put_opt_string(buf, self.receiver_component.as_deref());
        buf.put_i32(self.user_id);
        buf.put_i32(self.timestamp);
        buf.put_i16(self.offset_ms);
        buf.put_i32(self.caller_uid);
        buf.put_i32(self.caller_pid);
        buf.put_i32(self.receiver_uid);
        self.intent.encode(buf);
    }

    fn decode_fields(buf: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(Self {
            action: wire::get_opt_string(buf)?,
            caller_component: wire::get_opt_string(buf)?,
            flags: wire::get_i32(buf)?,
            receiver_component: wire::get_opt_string(buf)?,
            user_id: wire::get_i32(buf)?,
            timestamp: wire::get_i32(buf)?,
            offset_ms: wire::get_i16(buf)?,
            caller_uid: wire::get_i32(buf)?,
            caller_pid: wire::get_i32(buf)?,
            receiver_uid: wire::get_i32(buf)?,
            intent: IntentData::decode(buf)?,
        })
    }
}
