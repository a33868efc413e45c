//! Domain constants shared across the session layer.

use std::time::Duration;

/// SysML v2 source file extension.
pub const SYSML_EXT: &str = "sysml";

/// KerML source file extension.
pub const KERML_EXT: &str = "kerml";

/// Extensions picked up when loading a library root.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[SYSML_EXT, KERML_EXT];

/// Text notification announcing the workspace root.
pub const WORKSPACE_URI_PREFIX: &str = "WORKSPACE_URI";

/// Text notification listing files removed or renamed on disk.
pub const STRONG_FILES_CHANGED_PREFIX: &str = "STRONG_FILES_CHANGED";

/// Wait before erasing diagnostics of removed files.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// `source` field of every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "syster";

/// Progress title for model rebuilds.
pub const BUILD_PROGRESS_TITLE: &str = "Building semantic model";

/// Progress title for capability requests.
pub const REQUEST_PROGRESS_TITLE: &str = "Answering requests";
