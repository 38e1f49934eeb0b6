//! Raw intercepted-event model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind discriminator carried by a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Component-launch request (activity-style).
    Launch,
    /// Broadcast dispatch.
    Broadcast,
    /// Background-service request.
    Service,
}

impl EventKind {
    /// Map the wire discriminator to a kind. Unknown values yield `None`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Launch),
            1 => Some(Self::Broadcast),
            2 => Some(Self::Service),
            _ => None,
        }
    }

    /// The wire discriminator for this kind.
    pub fn as_raw(self) -> i32 {
        match self {
            Self::Launch => 0,
            Self::Broadcast => 1,
            Self::Service => 2,
        }
    }
}

/// A component reference: owning package plus class name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    /// Package that owns the component.
    pub package: String,
    /// Class name within the package.
    pub class: String,
}

impl ComponentRef {
    /// Create a component reference.
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }

    /// Short display name, `{package/class}`.
    pub fn short_string(&self) -> String {
        format!("{{{}/{}}}", self.package, self.class)
    }
}

/// Flattening a platform structure into bytes failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("opaque payload could not be flattened")]
pub struct MarshalError;

/// An opaque structure attached to a message.
///
/// Marshalling happens at classification time and may fail; the platform
/// occasionally hands over handles that cannot be flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobSource {
    /// The message carried no such structure.
    #[default]
    Absent,
    /// A structure that flattens to these bytes.
    Bytes(Vec<u8>),
    /// A structure whose marshal fails.
    Corrupt,
}

impl BlobSource {
    /// Flatten the structure. `Ok(None)` means absent.
    pub fn marshal(&self) -> Result<Option<Vec<u8>>, MarshalError> {
        match self {
            Self::Absent => Ok(None),
            Self::Bytes(bytes) => Ok(Some(bytes.clone())),
            Self::Corrupt => Err(MarshalError),
        }
    }
}

/// The underlying IPC message observed by the interception mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMessage {
    /// Action string.
    pub action: Option<String>,
    /// URI-like data reference.
    pub data: Option<String>,
    /// Message flags.
    pub flags: u32,
    /// Declared MIME type.
    pub mime_type: Option<String>,
    /// Categories in declaration order.
    pub categories: Vec<String>,
    /// Target component, if addressed.
    pub component: Option<ComponentRef>,
    /// Attached clip data.
    pub clip_data: BlobSource,
    /// Attached extras.
    pub extras: BlobSource,
}

/// Side-channel fields delivered alongside the message.
///
/// Numeric fields default to 0 and strings to absent when the
/// interception mechanism did not supply them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    /// Package of the calling component.
    pub calling_package: Option<String>,
    /// Request code (launch, broadcast).
    pub request_code: i32,
    /// Start flags (launch).
    pub start_flags: i32,
    /// Request flags (service).
    pub flags: i32,
    /// Platform user the request ran as.
    pub user_id: i32,
    /// Numeric identity of the caller.
    pub caller_uid: i32,
    /// Process id of the caller.
    pub caller_pid: i32,
    /// Permission the receiver must hold (broadcast).
    pub required_permission: Option<String>,
    /// Action override reported by the interceptor (service).
    pub service_action: Option<String>,
}

/// One raw capture event as delivered over the control channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Raw kind discriminator; see [`EventKind::from_raw`].
    pub kind: i32,
    /// Side-channel fields.
    pub fields: EventFields,
    /// The underlying message, absent when interception lost it.
    pub intent: Option<IntentMessage>,
}

impl CaptureRequest {
    /// Build a request for a known kind.
    pub fn new(kind: EventKind, fields: EventFields, intent: IntentMessage) -> Self {
        Self {
            kind: kind.as_raw(),
            fields,
            intent: Some(intent),
        }
    }
}
