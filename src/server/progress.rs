//! Progress notifications bracketing rebuilds and request waves.
//!
//! Each operation gets a fresh token (`build-<uuid>` or `request-<uuid>`);
//! a [`ProgressGuard`] sends `begin` on creation and `end` exactly once, when
//! finished explicitly or dropped.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::client::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Build,
    Request,
}

impl ProgressKind {
    fn prefix(self) -> &'static str {
        match self {
            ProgressKind::Build => "build",
            ProgressKind::Request => "request",
        }
    }
}

/// Opaque progress token, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProgressToken(String);

impl ProgressToken {
    pub fn new(kind: ProgressKind) -> Self {
        Self(format!("{}-{}", kind.prefix(), Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> Option<ProgressKind> {
        if self.0.starts_with("build-") {
            Some(ProgressKind::Build)
        } else if self.0.starts_with("request-") {
            Some(ProgressKind::Request)
        } else {
            None
        }
    }
}

impl fmt::Display for ProgressToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `$/progress` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProgressEvent {
    Begin {
        token: ProgressToken,
        title: String,
    },
    Report {
        token: ProgressToken,
        message: String,
    },
    End {
        token: ProgressToken,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ProgressEvent {
    pub fn token(&self) -> &ProgressToken {
        match self {
            ProgressEvent::Begin { token, .. }
            | ProgressEvent::Report { token, .. }
            | ProgressEvent::End { token, .. } => token,
        }
    }
}

/// Emits progress through the client.
#[derive(Clone)]
pub struct ProgressReporter {
    client: Arc<dyn Client>,
}

impl ProgressReporter {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self { client }
    }

    /// Start an operation; `begin` is sent immediately.
    pub fn begin(&self, kind: ProgressKind, title: &str) -> ProgressGuard {
        let token = ProgressToken::new(kind);
        tracing::trace!(token = %token, title, "progress begin");
        self.client.progress(ProgressEvent::Begin {
            token: token.clone(),
            title: title.to_string(),
        });
        ProgressGuard {
            client: Arc::clone(&self.client),
            token,
            ended: false,
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}

/// One in-flight operation.
pub struct ProgressGuard {
    client: Arc<dyn Client>,
    token: ProgressToken,
    ended: bool,
}

impl ProgressGuard {
    pub fn token(&self) -> &ProgressToken {
        &self.token
    }

    pub fn report(&self, message: impl Into<String>) {
        self.client.progress(ProgressEvent::Report {
            token: self.token.clone(),
            message: message.into(),
        });
    }

    pub fn finish(mut self, message: Option<String>) {
        self.end(message);
    }

    fn end(&mut self, message: Option<String>) {
        if self.ended {
            return;
        }
        self.ended = true;
        tracing::trace!(token = %self.token, "progress end");
        self.client.progress(ProgressEvent::End {
            token: self.token.clone(),
            message,
        });
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.end(None);
    }
}
