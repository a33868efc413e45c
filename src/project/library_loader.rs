use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use super::{LoadError, file_loader};
use crate::base::constants::SUPPORTED_EXTENSIONS;
use crate::engine::{LanguageEngine, ParsedDocument};
use crate::model::Library;

/// Loads library sources from the auxiliary library root announced by the host.
pub struct LibraryLoader {
    library_path: PathBuf,
    extensions: Vec<String>,
}

impl LibraryLoader {
    /// Creates a loader for the given library directory.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            library_path: path,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Restrict loading to these extensions.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn library_path(&self) -> &PathBuf {
        &self.library_path
    }

    /// Parse every library file through `engine`.
    ///
    /// A missing directory yields an empty library. Unreadable files are
    /// skipped with a warning; an engine failure aborts the load.
    pub fn load(&self, engine: &dyn LanguageEngine) -> Result<Library, LoadError> {
        if !self.library_path.is_dir() {
            tracing::warn!(
                path = %self.library_path.display(),
                "library root not found; continuing without library sources"
            );
            return Ok(Library::empty());
        }

        let extensions: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        let paths = file_loader::collect_file_paths_with(&self.library_path, &extensions)?;

        let sources: Vec<(PathBuf, String)> = paths
            .par_iter()
            .filter_map(|path| match file_loader::load_file(path) {
                Ok(text) => Some((path.clone(), text)),
                Err(e) => {
                    tracing::warn!("skipping library file: {e}");
                    None
                }
            })
            .collect();

        let documents = sources
            .par_iter()
            .map(|(path, text)| {
                let uri = file_loader::path_to_uri(path);
                engine
                    .parse(&uri, 0, text)
                    .map(Arc::new)
                    .map_err(|source| LoadError::Engine {
                        path: path.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<Arc<ParsedDocument>>, _>>()?;

        tracing::info!(
            path = %self.library_path.display(),
            files = documents.len(),
            "loaded library sources"
        );

        Ok(Library::new(self.library_path.clone(), documents))
    }
}
