use crate::base::constants::{STRONG_FILES_CHANGED_PREFIX, WORKSPACE_URI_PREFIX};

/// A custom plain-text notification from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextNotification {
    /// `WORKSPACE_URI:<path>`; everything after the first `:` is the path.
    WorkspaceUri(String),
    /// `STRONG_FILES_CHANGED:<uri1,uri2,...>`
    StrongFilesChanged(Vec<String>),
    Unknown(String),
}

impl TextNotification {
    pub fn parse(text: &str) -> Self {
        let Some((prefix, payload)) = text.split_once(':') else {
            return TextNotification::Unknown(text.to_string());
        };
        match prefix {
            WORKSPACE_URI_PREFIX => TextNotification::WorkspaceUri(payload.to_string()),
            STRONG_FILES_CHANGED_PREFIX => TextNotification::StrongFilesChanged(
                payload
                    .split(',')
                    .map(str::trim)
                    .filter(|uri| !uri.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => TextNotification::Unknown(text.to_string()),
        }
    }
}
