//! Session construction and event shorthands.

use std::sync::Arc;

use syster_session::server::{Session, SessionEvent};
use syster_session::workspace::BufferChange;
use syster_session::{SessionOptions, StructuralEngine};

use super::recording_client::RecordingClient;

pub fn new_session() -> (Session, Arc<RecordingClient>) {
    new_session_with(SessionOptions::default())
}

pub fn new_session_with(options: SessionOptions) -> (Session, Arc<RecordingClient>) {
    let client = Arc::new(RecordingClient::default());
    let session = Session::new(client.clone(), Arc::new(StructuralEngine::new()), options);
    (session, client)
}

pub fn announce_root(path: &str) -> SessionEvent {
    SessionEvent::Text(format!("WORKSPACE_URI:{path}"))
}

pub fn files_removed(uris: &[&str]) -> SessionEvent {
    SessionEvent::Text(format!("STRONG_FILES_CHANGED:{}", uris.join(",")))
}

pub fn open(uri: &str, text: &str, version: i32) -> SessionEvent {
    SessionEvent::Buffer(BufferChange::Open {
        uri: uri.to_string(),
        text: text.to_string(),
        version,
    })
}

pub fn change(uri: &str, text: &str, version: i32) -> SessionEvent {
    SessionEvent::Buffer(BufferChange::Change {
        uri: uri.to_string(),
        text: text.to_string(),
        version,
    })
}

pub fn close(uri: &str) -> SessionEvent {
    SessionEvent::Buffer(BufferChange::Close {
        uri: uri.to_string(),
    })
}
