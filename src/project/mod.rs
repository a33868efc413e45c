pub mod file_loader;
mod library_loader;

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;

pub use library_loader::LibraryLoader;

/// Errors while loading library sources from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("No file extension: {}", .0.display())]
    NoExtension(PathBuf),

    #[error("Unsupported file extension: {}", .0.display())]
    UnsupportedExtension(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error("Engine failed on {}: {source}", path.display())]
    Engine {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
}
