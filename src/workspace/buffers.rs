use std::sync::Arc;

use indexmap::IndexMap;

use super::{BufferChange, WorkspaceError, WorkspaceRoot};
use crate::model::SourceFile;

/// A host-owned open document, mirrored read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub uri: String,
    pub text: Arc<str>,
    pub version: i32,
}

/// Mirror of every open buffer, in or out of the workspace root.
#[derive(Debug, Default)]
pub struct BufferSet {
    buffers: IndexMap<String, Buffer>,
}

impl BufferSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one lifecycle event.
    ///
    /// A change for a buffer that was never opened is treated as an open; a
    /// change older than the mirrored version is rejected.
    pub fn apply(&mut self, change: BufferChange) -> Result<(), WorkspaceError> {
        match change {
            BufferChange::Open { uri, text, version } => {
                self.insert(uri, text, version);
                Ok(())
            }
            BufferChange::Change { uri, text, version } => {
                if let Some(current) = self.buffers.get(&uri) {
                    if version < current.version {
                        return Err(WorkspaceError::StaleVersion {
                            uri,
                            current: current.version,
                            received: version,
                        });
                    }
                }
                self.insert(uri, text, version);
                Ok(())
            }
            BufferChange::Close { uri } => match self.buffers.shift_remove(&uri) {
                Some(_) => Ok(()),
                None => Err(WorkspaceError::UnknownBuffer(uri)),
            },
        }
    }

    fn insert(&mut self, uri: String, text: String, version: i32) {
        let buffer = Buffer {
            uri: uri.clone(),
            text: Arc::from(text),
            version,
        };
        self.buffers.insert(uri, buffer);
    }

    pub fn get(&self, uri: &str) -> Option<&Buffer> {
        self.buffers.get(uri)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Builder input: only the buffers under `root`.
    pub fn in_root(&self, root: &WorkspaceRoot) -> Vec<SourceFile> {
        self.buffers
            .values()
            .filter(|b| root.contains_uri(&b.uri))
            .map(|b| SourceFile::new(b.uri.clone(), b.version, Arc::clone(&b.text)))
            .collect()
    }
}
