//! Outbound messages to the editor host.

use serde::{Deserialize, Serialize};

use super::progress::ProgressEvent;
use crate::base::Span;
use crate::base::constants::DIAGNOSTIC_SOURCE;
use crate::engine::Problem;

/// Sink for everything the session sends to the host.
///
/// Implementations forward to the transport; calls must not block on the
/// host's reply.
pub trait Client: Send + Sync + 'static {
    fn publish_diagnostics(&self, params: PublishDiagnostics);

    fn progress(&self, event: ProgressEvent);

    /// Ask the host for the current configuration. The answer comes back as
    /// a `ConfigurationReceived` event.
    fn request_configuration(&self);
}

/// LSP diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Span,
    pub severity: u32,
    pub code: String,
    pub source: String,
    pub message: String,
}

impl From<&Problem> for Diagnostic {
    fn from(problem: &Problem) -> Self {
        Self {
            range: problem.span,
            severity: problem.severity.to_lsp(),
            code: problem.code.to_string(),
            source: DIAGNOSTIC_SOURCE.to_string(),
            message: problem.message.clone(),
        }
    }
}

/// `textDocument/publishDiagnostics` params.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDiagnostics {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PublishDiagnostics {
    /// Clears all diagnostics of `uri`.
    pub fn empty(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            version: None,
            diagnostics: Vec::new(),
        }
    }
}
