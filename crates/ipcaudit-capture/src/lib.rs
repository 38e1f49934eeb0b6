//! Intercepted-event model and classifier for IpcAudit.
//!
//! The interception mechanism forwards raw IPC events as
//! [`CaptureRequest`] values: a kind discriminator, a bag of
//! side-channel fields, and the underlying message. The [`Classifier`]
//! normalizes each request into one [`ipcaudit_format::EventRecord`],
//! degrading gracefully wherever the raw event is incomplete.

mod classify;
mod event;
mod registry;

pub use classify::{Classifier, Rejection};
pub use event::{
    BlobSource, CaptureRequest, ComponentRef, EventFields, EventKind, IntentMessage,
    MarshalError,
};
pub use registry::{IdentityRegistry, LookupError, NullRegistry, StaticRegistry};
