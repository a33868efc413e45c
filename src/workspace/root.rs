use std::fmt;
use std::path::{Path, PathBuf};

use super::WorkspaceError;

/// The single workspace root of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceRoot(PathBuf);

impl WorkspaceRoot {
    /// Interpret an announced root. `file://` URIs become their path; anything
    /// else is taken as a literal path.
    pub fn parse(raw: &str) -> Self {
        let path = match url::Url::parse(raw) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .unwrap_or_else(|()| PathBuf::from(raw)),
            _ => PathBuf::from(raw),
        };
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Whether the buffer identified by `uri` lives under this root.
    ///
    /// `file://` URIs and plain paths are compared component-wise; other
    /// schemes (`untitled:`, ...) are never in root.
    pub fn contains_uri(&self, uri: &str) -> bool {
        uri_to_path(uri).is_some_and(|path| path.starts_with(&self.0))
    }
}

impl fmt::Display for WorkspaceRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

fn uri_to_path(uri: &str) -> Option<PathBuf> {
    match url::Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(_) => None,
        Err(_) => Some(PathBuf::from(uri)),
    }
}

/// Outcome of a root announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    /// The root was unset and is now known.
    First,
    /// The same root was announced again; nothing changes.
    Repeat,
}

/// Holds the workspace root; set once per session.
#[derive(Debug, Default)]
pub struct RootResolver {
    root: Option<WorkspaceRoot>,
}

impl RootResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the root. A differing second announcement is rejected and the
    /// first root is kept.
    pub fn announce(&mut self, root: WorkspaceRoot) -> Result<Announcement, WorkspaceError> {
        match &self.root {
            None => {
                tracing::info!(root = %root, "workspace root announced");
                self.root = Some(root);
                Ok(Announcement::First)
            }
            Some(current) if *current == root => {
                tracing::debug!(root = %root, "workspace root announced again");
                Ok(Announcement::Repeat)
            }
            Some(current) => Err(WorkspaceError::DuplicateRootAnnouncement {
                first: current.clone(),
                second: root,
            }),
        }
    }

    pub fn is_known(&self) -> bool {
        self.root.is_some()
    }

    pub fn get(&self) -> Option<&WorkspaceRoot> {
        self.root.as_ref()
    }
}
