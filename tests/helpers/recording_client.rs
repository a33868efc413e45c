//! A [`Client`] that records everything the session sends.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use syster_session::server::{Client, ProgressEvent, PublishDiagnostics};

#[derive(Default)]
pub struct RecordingClient {
    diagnostics: Mutex<Vec<PublishDiagnostics>>,
    progress: Mutex<Vec<ProgressEvent>>,
    configuration_requests: AtomicUsize,
}

impl Client for RecordingClient {
    fn publish_diagnostics(&self, params: PublishDiagnostics) {
        self.diagnostics.lock().push(params);
    }

    fn progress(&self, event: ProgressEvent) {
        self.progress.lock().push(event);
    }

    fn request_configuration(&self) {
        self.configuration_requests.fetch_add(1, Ordering::SeqCst);
    }
}

impl RecordingClient {
    pub fn diagnostics(&self) -> Vec<PublishDiagnostics> {
        self.diagnostics.lock().clone()
    }

    /// Every notification sent for `uri`, oldest first.
    pub fn diagnostics_for(&self, uri: &str) -> Vec<PublishDiagnostics> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|p| p.uri == uri)
            .cloned()
            .collect()
    }

    pub fn clear_diagnostics(&self) {
        self.diagnostics.lock().clear();
    }

    pub fn progress(&self) -> Vec<ProgressEvent> {
        self.progress.lock().clone()
    }

    pub fn configuration_requests(&self) -> usize {
        self.configuration_requests.load(Ordering::SeqCst)
    }
}
