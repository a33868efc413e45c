use thiserror::Error;

use crate::config::ConfigError;
use crate::ide::Capability;
use crate::model::BuildError;
use crate::project::LoadError;
use crate::workspace::{BufferChange, WorkspaceError, WorkspaceRoot};

/// Errors raised while the session processes one inbound event.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The event needs the workspace root; it is handed back for deferral.
    #[error("workspace root not yet known; deferring event for {}", .0.uri())]
    RootNotYetKnown(Box<BufferChange>),

    #[error("workspace root already set to {first}; ignoring announcement of {second}")]
    DuplicateRootAnnouncement {
        first: WorkspaceRoot,
        second: WorkspaceRoot,
    },

    #[error("rebuild failed, keeping the previous model: {0}")]
    Rebuild(#[from] BuildError),

    #[error("no open buffer for {0}")]
    UnknownBuffer(String),

    #[error("stale change for {uri}: version {received} is older than {current}")]
    StaleVersion {
        uri: String,
        current: i32,
        received: i32,
    },

    #[error("library load failed: {0}")]
    Library(#[from] LoadError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl SessionError {
    /// Errors that indicate a broken invariant rather than one bad event.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SessionError::DuplicateRootAnnouncement { .. } | SessionError::Rebuild(_)
        )
    }
}

impl From<WorkspaceError> for SessionError {
    fn from(error: WorkspaceError) -> Self {
        match error {
            WorkspaceError::DuplicateRootAnnouncement { first, second } => {
                SessionError::DuplicateRootAnnouncement { first, second }
            }
            WorkspaceError::UnknownBuffer(uri) => SessionError::UnknownBuffer(uri),
            WorkspaceError::StaleVersion {
                uri,
                current,
                received,
            } => SessionError::StaleVersion {
                uri,
                current,
                received,
            },
        }
    }
}

/// Why a capability request produced no response value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("no handler registered for {0}")]
    UnknownCapability(Capability),

    #[error("request cancelled")]
    Cancelled,

    #[error("session shut down before the request was answered")]
    Shutdown,
}
