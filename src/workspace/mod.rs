//! # Workspace
//!
//! Session-side view of the editor workspace: the single root, the mirror of
//! open buffers, and the queue of buffer events that arrived before the root
//! was announced.

mod buffers;
mod deferred;
mod root;

use thiserror::Error;

pub use buffers::{Buffer, BufferSet};
pub use deferred::{DeferredChangeQueue, DrainReport};
pub use root::{Announcement, RootResolver, WorkspaceRoot};

/// A buffer lifecycle event from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferChange {
    Open {
        uri: String,
        text: String,
        version: i32,
    },
    Change {
        uri: String,
        text: String,
        version: i32,
    },
    Close {
        uri: String,
    },
}

impl BufferChange {
    pub fn uri(&self) -> &str {
        match self {
            BufferChange::Open { uri, .. }
            | BufferChange::Change { uri, .. }
            | BufferChange::Close { uri } => uri,
        }
    }

    pub fn version(&self) -> Option<i32> {
        match self {
            BufferChange::Open { version, .. } | BufferChange::Change { version, .. } => {
                Some(*version)
            }
            BufferChange::Close { .. } => None,
        }
    }
}

/// Errors attributable to one buffer event or to the root announcement.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace root already set to {first}; ignoring announcement of {second}")]
    DuplicateRootAnnouncement {
        first: WorkspaceRoot,
        second: WorkspaceRoot,
    },

    #[error("no open buffer for {0}")]
    UnknownBuffer(String),

    #[error("stale change for {uri}: version {received} is older than {current}")]
    StaleVersion {
        uri: String,
        current: i32,
        received: i32,
    },
}
