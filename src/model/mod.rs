//! Model: the immutable, workspace-wide semantic snapshot.
//!
//! A [`Model`] aggregates the parsed form of every in-root buffer plus the
//! library sources. It is produced wholesale by the [`ModelBuilder`] and
//! shared through `Arc`; nothing mutates a model after it is built. Requests
//! that already hold an older snapshot keep reading it unchanged.

mod builder;


use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::engine::{ParsedDocument, Symbol};

pub use builder::{BuildError, ModelBuilder};

/// One buffer handed to the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub uri: String,
    pub version: i32,
    pub text: Arc<str>,
}

impl SourceFile {
    pub fn new(uri: impl Into<String>, version: i32, text: impl Into<Arc<str>>) -> Self {
        Self {
            uri: uri.into(),
            version,
            text: text.into(),
        }
    }
}

/// Parsed library sources (the built-in/standard library).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Library {
    root: Option<PathBuf>,
    documents: Vec<Arc<ParsedDocument>>,
}

impl Library {
    /// A library with no sources.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(root: PathBuf, documents: Vec<Arc<ParsedDocument>>) -> Self {
        Self {
            root: Some(root),
            documents,
        }
    }

    pub fn root(&self) -> Option<&PathBuf> {
        self.root.as_ref()
    }

    pub fn documents(&self) -> &[Arc<ParsedDocument>] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Where a symbol was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolOrigin {
    Workspace,
    Library,
}

/// A symbol together with the document that declares it.
#[derive(Clone, Copy, Debug)]
pub struct SymbolRef<'a> {
    pub symbol: &'a Symbol,
    pub document: &'a ParsedDocument,
    pub origin: SymbolOrigin,
}

/// Immutable semantic snapshot of the workspace.
#[derive(Debug, Clone)]
pub struct Model {
    generation: u64,
    documents: IndexMap<String, Arc<ParsedDocument>>,
    library: Arc<Library>,
}

impl Model {
    pub(crate) fn new(
        generation: u64,
        documents: IndexMap<String, Arc<ParsedDocument>>,
        library: Arc<Library>,
    ) -> Self {
        Self {
            generation,
            documents,
            library,
        }
    }

    /// A model with no documents, used before the first real build.
    pub fn empty() -> Self {
        Self::new(0, IndexMap::new(), Arc::new(Library::empty()))
    }

    /// Monotonic build counter (1 for the first build).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Workspace documents, ordered by URI.
    pub fn documents(&self) -> impl Iterator<Item = &Arc<ParsedDocument>> {
        self.documents.values()
    }

    pub fn document(&self, uri: &str) -> Option<&Arc<ParsedDocument>> {
        self.documents.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    /// Every symbol: workspace documents first, then the library.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolRef<'_>> {
        let workspace = self
            .documents
            .values()
            .map(|doc| (doc, SymbolOrigin::Workspace));
        let library = self
            .library
            .documents()
            .iter()
            .map(|doc| (doc, SymbolOrigin::Library));

        workspace.chain(library).flat_map(|(document, origin)| {
            document.symbols.iter().map(move |symbol| SymbolRef {
                symbol,
                document: document.as_ref(),
                origin,
            })
        })
    }

    /// Symbols whose simple name matches `name`.
    pub fn lookup_simple<'a>(&'a self, name: &str) -> impl Iterator<Item = SymbolRef<'a>> {
        self.symbols().filter(move |r| &*r.symbol.name == name)
    }

    /// The symbol with exactly this qualified name, if any.
    pub fn lookup_qualified(&self, qualified_name: &str) -> Option<SymbolRef<'_>> {
        self.symbols()
            .find(|r| &*r.symbol.qualified_name == qualified_name)
    }

    /// Same documents and library, ignoring the generation number.
    pub fn same_content(&self, other: &Model) -> bool {
        self.documents.len() == other.documents.len()
            && self
                .documents
                .iter()
                .zip(other.documents.iter())
                .all(|((ua, a), (ub, b))| ua == ub && a == b)
            && self.library == other.library
    }
}
