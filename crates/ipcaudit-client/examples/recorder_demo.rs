//! End-to-end recorder demo: spawn a recorder with a file store, drive
//! a short capture session as both controller and interception source,
//! and save the log.
//!
//! Run with: cargo run --example recorder_demo

use std::sync::Arc;
use std::time::Duration;

use ipcaudit_capture::{
    CaptureRequest, ComponentRef, EventFields, EventKind, IntentMessage, StaticRegistry,
};
use ipcaudit_client::{Controller, CountPoller, VisibilityGate};
use ipcaudit_service::{spawn, Command, ControlMessage, FileLogStore, RecorderConfig};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store_dir = std::env::temp_dir().join("ipcaudit-demo");
    info!(dir = %store_dir.display(), "writing logs to");

    let registry = StaticRegistry::new()
        .insert("com.example.music", 10_050)
        .insert("com.example.mail", 10_051);

    let (endpoint, worker) = spawn(
        RecorderConfig {
            host_version: "7.1.2".into(),
            own_uid: 1000,
        },
        Arc::new(registry),
        Arc::new(FileLogStore::new(store_dir)),
    );

    // The controller binds as a system identity.
    let controller = Controller::new(endpoint.bind(0).expect("controller bind"));
    controller.start_capture();

    // Live counter, as a visible host would run it.
    let (gate, visibility) = VisibilityGate::new();
    let poller = CountPoller::with_interval(
        controller.handle().clone(),
        visibility,
        Duration::from_millis(200),
    );
    let poller_task = tokio::spawn(poller.run(|count| info!(count, "records so far")));

    // The interception source binds separately and reports events,
    // waiting for each acknowledgment before letting the IPC proceed.
    let source = endpoint.bind(1000).expect("source bind");
    let (ack, mut acks) = mpsc::unbounded_channel();
    for (package, class, action) in [
        ("com.example.music", "com.example.music.Player", "MAIN"),
        ("com.example.mail", "com.example.mail.Compose", "SEND"),
        ("com.example.mail", "com.example.mail.Sync", "SYNC"),
    ] {
        let request = CaptureRequest::new(
            EventKind::Launch,
            EventFields {
                calling_package: Some("com.example.home".into()),
                caller_uid: 10_001,
                ..EventFields::default()
            },
            IntentMessage {
                action: Some(action.into()),
                component: Some(ComponentRef::new(package, class)),
                ..IntentMessage::default()
            },
        );
        source
            .send_message(ControlMessage::with_reply(
                Command::CheckIntent(request),
                ack.clone(),
            ))
            .expect("recorder alive");
        acks.recv().await.expect("event acknowledged");
    }

    tokio::time::sleep(Duration::from_millis(500)).await;

    controller.save_log();
    controller.stop_capture();
    tokio::time::sleep(Duration::from_millis(100)).await;

    poller_task.abort();
    drop((controller, source, endpoint));
    worker.await.expect("recorder worker");
    info!("done");
}
