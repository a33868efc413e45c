//! Language engine boundary.
//!
//! The session never parses text itself. It hands buffer contents to a
//! [`LanguageEngine`], which returns a [`ParsedDocument`]: the declarations it
//! found plus any structural problems. Malformed source is *not* an error at
//! this boundary; only engine-internal or I/O failures are.

pub mod lexer;
mod structural;

use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{LineIndex, Span};

pub use structural::StructuralEngine;

/// Failure inside the language engine itself.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine hit an internal invariant violation.
    #[error("engine failure while analysing {uri}: {message}")]
    Internal { uri: String, message: String },

    /// IO error while the engine read auxiliary input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn internal(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

/// Severity level of a problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A structural problem recorded on a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub span: Span,
    pub severity: Severity,
    pub code: SmolStr,
    pub message: String,
}

impl Problem {
    pub fn error(span: Span, code: &str, message: impl Into<String>) -> Self {
        Self {
            span,
            severity: Severity::Error,
            code: SmolStr::new(code),
            message: message.into(),
        }
    }

    pub fn warning(span: Span, code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(span, code, message)
        }
    }
}

/// Kind of a declared symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Package,
    Definition,
    Usage,
    Alias,
}

impl SymbolKind {
    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Package => "package",
            SymbolKind::Definition => "definition",
            SymbolKind::Usage => "usage",
            SymbolKind::Alias => "alias",
        }
    }

    /// Convert to LSP symbol kind number.
    pub fn to_lsp_symbol(&self) -> u32 {
        match self {
            SymbolKind::Package => 4,    // Package
            SymbolKind::Definition => 5, // Class
            SymbolKind::Usage => 8,      // Field
            SymbolKind::Alias => 13,     // Variable
        }
    }

    pub fn is_definition(&self) -> bool {
        matches!(self, SymbolKind::Definition | SymbolKind::Package)
    }
}

/// A declaration found in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: Arc<str>,
    pub qualified_name: Arc<str>,
    pub kind: SymbolKind,
    /// Declaring keyword(s) as written, e.g. `part def`.
    pub keyword: SmolStr,
    /// Span of the name.
    pub span: Span,
    /// Qualified name of the enclosing declaration.
    pub container: Option<Arc<str>>,
}

/// Engine output for one source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDocument {
    pub uri: String,
    pub version: i32,
    pub text: Arc<str>,
    pub line_index: LineIndex,
    pub symbols: Vec<Symbol>,
    pub problems: Vec<Problem>,
}

impl ParsedDocument {
    pub fn has_errors(&self) -> bool {
        self.problems.iter().any(|p| p.severity == Severity::Error)
    }

    /// The innermost symbol whose name span contains `position`.
    pub fn symbol_at(&self, position: crate::base::Position) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.span.contains(position))
    }
}

/// Parses and validates source text.
///
/// Implementations must be deterministic and must not panic or error on
/// malformed input; problems go into [`ParsedDocument::problems`].
pub trait LanguageEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Analyse one document.
    fn parse(&self, uri: &str, version: i32, text: &str) -> Result<ParsedDocument, EngineError>;
}
