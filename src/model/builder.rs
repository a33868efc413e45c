use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use thiserror::Error;

use super::{Library, Model, SourceFile};
use crate::engine::{EngineError, LanguageEngine, ParsedDocument};

/// A rebuild that could not produce a model.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("language engine `{engine}` failed: {source}")]
    Engine {
        engine: String,
        #[source]
        source: EngineError,
    },
}

/// Builds [`Model`] snapshots from buffer contents.
///
/// `build` is a pure function of its inputs: it never mutates the files or the
/// base model, and identical inputs yield models with identical content.
pub struct ModelBuilder {
    engine: Arc<dyn LanguageEngine>,
    /// Installed library; when unset the base model's library is carried over.
    library: Option<Arc<Library>>,
}

impl ModelBuilder {
    pub fn new(engine: Arc<dyn LanguageEngine>) -> Self {
        Self {
            engine,
            library: None,
        }
    }

    pub fn engine(&self) -> &Arc<dyn LanguageEngine> {
        &self.engine
    }

    /// Install library sources for every subsequent build.
    pub fn set_library(&mut self, library: Arc<Library>) {
        self.library = Some(library);
    }

    pub fn has_library(&self) -> bool {
        self.library.is_some()
    }

    /// Build a new model from `files`.
    ///
    /// Documents whose URI, version and text match an entry of `base` are
    /// reused instead of re-parsed. Malformed sources produce documents that
    /// carry problems; only engine failures are returned as errors.
    pub fn build(&self, files: &[SourceFile], base: Option<&Model>) -> Result<Model, BuildError> {
        let mut ordered: Vec<&SourceFile> = files.iter().collect();
        ordered.sort_by(|a, b| a.uri.cmp(&b.uri));
        ordered.dedup_by(|a, b| a.uri == b.uri);

        let parsed = ordered
            .par_iter()
            .map(|file| self.parse_or_reuse(file, base))
            .collect::<Result<Vec<_>, _>>()?;

        let documents: IndexMap<String, Arc<ParsedDocument>> = parsed
            .into_iter()
            .map(|doc| (doc.uri.clone(), doc))
            .collect();

        let library = self
            .library
            .clone()
            .or_else(|| base.map(|b| Arc::clone(b.library())))
            .unwrap_or_default();
        let generation = base.map_or(1, |b| b.generation() + 1);

        tracing::debug!(
            generation,
            documents = documents.len(),
            library = library.len(),
            "built semantic model"
        );

        Ok(Model::new(generation, documents, library))
    }

    fn parse_or_reuse(
        &self,
        file: &SourceFile,
        base: Option<&Model>,
    ) -> Result<Arc<ParsedDocument>, BuildError> {
        if let Some(previous) = base.and_then(|m| m.document(&file.uri)) {
            if previous.version == file.version && previous.text == file.text {
                return Ok(Arc::clone(previous));
            }
        }

        self.engine
            .parse(&file.uri, file.version, &file.text)
            .map(Arc::new)
            .map_err(|source| BuildError::Engine {
                engine: self.engine.name().to_string(),
                source,
            })
    }
}
