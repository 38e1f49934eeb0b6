//! Event classification: raw capture requests to encoded record variants.

use std::sync::Arc;

use chrono::Utc;
use ipcaudit_format::{
    BroadcastRecord, EventRecord, IntentData, LaunchRecord, ServiceRecord,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::event::{BlobSource, CaptureRequest, EventKind, IntentMessage};
use crate::registry::IdentityRegistry;

/// A capture request that produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The request carried no underlying message.
    #[error("capture request carried no message")]
    MissingPayload,
    /// The kind discriminator was not recognized.
    #[error("unrecognized event kind {0}")]
    UnknownKind(i32),
}

/// Normalizes raw capture requests into [`EventRecord`]s.
///
/// Classification has no side effects; every recoverable extraction
/// failure degrades to a default value and the record is still produced.
pub struct Classifier {
    registry: Arc<dyn IdentityRegistry>,
}

impl Classifier {
    /// Create a classifier resolving receiver identities through
    /// `registry`.
    pub fn new(registry: Arc<dyn IdentityRegistry>) -> Self {
        Self { registry }
    }

    /// Classify one raw request.
    pub fn classify(&self, request: &CaptureRequest) -> Result<EventRecord, Rejection> {
        let intent = request.intent.as_ref().ok_or(Rejection::MissingPayload)?;
        let kind = EventKind::from_raw(request.kind)
            .ok_or(Rejection::UnknownKind(request.kind))?;

        let (receiver_component, receiver_uid) = self.resolve_receiver(intent);
        let payload = extract_payload(intent);

        // One clock reading covers both the second and millisecond parts.
        let now_ms = Utc::now().timestamp_millis();
        let timestamp = (now_ms / 1000) as i32;
        let offset_ms = (now_ms % 1000) as i16;

        let fields = &request.fields;
        let record = match kind {
            EventKind::Launch => EventRecord::Launch(LaunchRecord {
                caller_component: fields.calling_package.clone(),
                receiver_component,
                request_code: fields.request_code,
                start_flags: fields.start_flags,
                user_id: fields.user_id,
                timestamp,
                offset_ms,
                caller_uid: fields.caller_uid,
                caller_pid: fields.caller_pid,
                receiver_uid,
                intent: payload,
            }),
            EventKind::Broadcast => EventRecord::Broadcast(BroadcastRecord {
                receiver_component,
                request_code: fields.request_code,
                required_permission: fields.required_permission.clone(),
                user_id: fields.user_id,
                timestamp,
                offset_ms,
                receiver_uid,
                intent: payload,
            }),
            EventKind::Service => EventRecord::Service(ServiceRecord {
                action: fields.service_action.clone(),
                caller_component: fields.calling_package.clone(),
                flags: fields.flags,
                receiver_component,
                user_id: fields.user_id,
                timestamp,
                offset_ms,
                caller_uid: fields.caller_uid,
                caller_pid: fields.caller_pid,
                receiver_uid,
                intent: payload,
            }),
        };
        Ok(record)
    }

    /// Receiver short name and owning identity; identity falls back to 0
    /// when the registry cannot resolve the package.
    fn resolve_receiver(&self, intent: &IntentMessage) -> (Option<String>, i32) {
        let Some(component) = &intent.component else {
            return (None, 0);
        };
        let uid = match self.registry.resolve_owner_identity(&component.package) {
            Ok(uid) => uid,
            Err(error) => {
                debug!(%error, "receiver identity unresolved");
                0
            }
        };
        (Some(component.short_string()), uid)
    }
}

fn extract_payload(intent: &IntentMessage) -> IntentData {
    IntentData {
        action: intent.action.clone(),
        data: intent.data.clone(),
        flags: intent.flags,
        mime_type: intent.mime_type.clone(),
        categories: intent.categories.join(";"),
        clip_data: marshal_blob(&intent.clip_data, "clip data"),
        extras: marshal_blob(&intent.extras, "extras"),
    }
}

fn marshal_blob(source: &BlobSource, what: &str) -> Vec<u8> {
    match source.marshal() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => Vec::new(),
        Err(error) => {
            warn!(%error, "skipping {what}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ComponentRef, EventFields};
    use crate::registry::{NullRegistry, StaticRegistry};

    fn classifier() -> Classifier {
        Classifier::new(Arc::new(
            StaticRegistry::new().insert("com.example.music", 10_050),
        ))
    }

    fn launch_request() -> CaptureRequest {
        CaptureRequest::new(
            EventKind::Launch,
            EventFields {
                calling_package: Some("com.example.home".into()),
                request_code: 3,
                start_flags: 1,
                user_id: 0,
                caller_uid: 10_001,
                caller_pid: 812,
                ..EventFields::default()
            },
            IntentMessage {
                action: Some("MAIN".into()),
                flags: 0x10,
                categories: vec!["LAUNCHER".into(), "DEFAULT".into()],
                component: Some(ComponentRef::new("com.example.music", "com.example.music.Player")),
                clip_data: BlobSource::Bytes(vec![5, 6]),
                extras: BlobSource::Absent,
                ..IntentMessage::default()
            },
        )
    }

    #[test]
    fn classifies_launch_request() {
        let record = classifier().classify(&launch_request()).unwrap();
        let EventRecord::Launch(launch) = record else {
            panic!("expected launch record");
        };
        assert_eq!(launch.caller_component.as_deref(), Some("com.example.home"));
        assert_eq!(
            launch.receiver_component.as_deref(),
            Some("{com.example.music/com.example.music.Player}")
        );
        assert_eq!(launch.receiver_uid, 10_050);
        assert_eq!(launch.caller_uid, 10_001);
        assert_eq!(launch.request_code, 3);
        assert_eq!(launch.intent.categories, "LAUNCHER;DEFAULT");
        assert_eq!(launch.intent.clip_data, vec![5, 6]);
        assert!(launch.intent.extras.is_empty());
        assert!((0..1000).contains(&launch.offset_ms));
    }

    #[test]
    fn classifies_broadcast_request() {
        let request = CaptureRequest::new(
            EventKind::Broadcast,
            EventFields {
                request_code: -1,
                required_permission: Some("WAKE_LOCK".into()),
                user_id: 10,
                ..EventFields::default()
            },
            IntentMessage {
                action: Some("BOOT_COMPLETED".into()),
                ..IntentMessage::default()
            },
        );
        let EventRecord::Broadcast(broadcast) = classifier().classify(&request).unwrap()
        else {
            panic!("expected broadcast record");
        };
        assert_eq!(broadcast.receiver_component, None);
        assert_eq!(broadcast.receiver_uid, 0);
        assert_eq!(broadcast.required_permission.as_deref(), Some("WAKE_LOCK"));
        assert_eq!(broadcast.user_id, 10);
        assert_eq!(broadcast.intent.action.as_deref(), Some("BOOT_COMPLETED"));
    }

    #[test]
    fn service_action_override_comes_from_fields() {
        let request = CaptureRequest::new(
            EventKind::Service,
            EventFields {
                service_action: Some("bind".into()),
                flags: 4,
                ..EventFields::default()
            },
            IntentMessage {
                action: Some("intent-action".into()),
                ..IntentMessage::default()
            },
        );
        let EventRecord::Service(service) = classifier().classify(&request).unwrap()
        else {
            panic!("expected service record");
        };
        assert_eq!(service.action.as_deref(), Some("bind"));
        assert_eq!(service.flags, 4);
        // The payload still records the message's own action.
        assert_eq!(service.intent.action.as_deref(), Some("intent-action"));
    }

    #[test]
    fn missing_payload_is_reported() {
        let request = CaptureRequest {
            kind: 0,
            fields: EventFields::default(),
            intent: None,
        };
        assert_eq!(
            classifier().classify(&request),
            Err(Rejection::MissingPayload)
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let request = CaptureRequest {
            kind: 7,
            fields: EventFields::default(),
            intent: Some(IntentMessage::default()),
        };
        assert_eq!(
            classifier().classify(&request),
            Err(Rejection::UnknownKind(7))
        );
    }

    #[test]
    fn corrupt_blobs_degrade_to_empty() {
        let mut request = launch_request();
        let intent = request.intent.as_mut().unwrap();
        intent.clip_data = BlobSource::Corrupt;
        intent.extras = BlobSource::Corrupt;

        let classifier = classifier();
        let record = classifier.classify(&request).unwrap();
        assert!(record.intent().clip_data.is_empty());
        assert!(record.intent().extras.is_empty());

        // Capture keeps going afterwards.
        assert!(classifier.classify(&launch_request()).is_ok());
    }

    #[test]
    fn unresolved_identity_defaults_to_zero() {
        let classifier = Classifier::new(Arc::new(NullRegistry));
        let record = classifier.classify(&launch_request()).unwrap();
        let EventRecord::Launch(launch) = record else {
            panic!("expected launch record");
        };
        assert_eq!(launch.receiver_uid, 0);
        assert!(launch.receiver_component.is_some());
    }

    #[test]
    fn empty_category_list_joins_to_empty_string() {
        let request = CaptureRequest::new(
            EventKind::Launch,
            EventFields::default(),
            IntentMessage::default(),
        );
        let record = classifier().classify(&request).unwrap();
        assert_eq!(record.intent().categories, "");
    }
}
