//! IDE features: capability handlers answered against a model snapshot.
//!
//! Every handler is a pure function of `(params, Context, cancel)`. The
//! [`Context`] pairs one [`Model`] with one [`ClientConfiguration`]; a handler
//! sees that pair for the whole call even if a newer one is bound meanwhile.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No LSP types**: Uses our own types, converted at the JSON boundary
//! 3. **Stateless**: All state lives in the bound `Context`

mod completion;
mod formatting;
mod goto;
mod hover;
mod symbols;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use smol_str::SmolStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::base::Position;
use crate::config::ClientConfiguration;
use crate::core::text_utils::{qualified_name_at, word_at};
use crate::engine::ParsedDocument;
use crate::model::{Model, SymbolRef};

pub use completion::{CompletionItem, CompletionKind, completions};
pub use formatting::{TextEdit, format_document};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use hover::{HoverResult, hover};
pub use symbols::{SymbolInfo, document_symbols};

/// A capability the coordinator dispatches requests for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Completion,
    Hover,
    Definition,
    Formatting,
    DocumentSymbol,
    /// Any other request method.
    Custom(SmolStr),
}

impl Capability {
    pub const BUILTIN: [Capability; 5] = [
        Capability::Completion,
        Capability::Hover,
        Capability::Definition,
        Capability::Formatting,
        Capability::DocumentSymbol,
    ];

    /// The LSP request method.
    pub fn method(&self) -> &str {
        match self {
            Capability::Completion => "textDocument/completion",
            Capability::Hover => "textDocument/hover",
            Capability::Definition => "textDocument/definition",
            Capability::Formatting => "textDocument/formatting",
            Capability::DocumentSymbol => "textDocument/documentSymbol",
            Capability::Custom(method) => method.as_str(),
        }
    }

    pub fn from_method(method: &str) -> Self {
        Self::BUILTIN
            .into_iter()
            .find(|c| c.method() == method)
            .unwrap_or_else(|| Capability::Custom(SmolStr::new(method)))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// The `(Model, ClientConfiguration)` pair a handler is bound to.
#[derive(Clone, Debug)]
pub struct Context {
    pub model: Arc<Model>,
    pub config: Arc<ClientConfiguration>,
}

impl Context {
    pub fn new(model: Arc<Model>, config: Arc<ClientConfiguration>) -> Self {
        Self { model, config }
    }

    /// A workspace document, or a library document with that URI.
    pub fn document(&self, uri: &str) -> Result<&ParsedDocument, HandlerError> {
        if let Some(document) = self.model.document(uri) {
            return Ok(document.as_ref());
        }
        self.model
            .library()
            .documents()
            .iter()
            .find(|d| d.uri == uri)
            .map(|d| d.as_ref())
            .ok_or_else(|| HandlerError::UnknownDocument(uri.to_string()))
    }
}

/// Failure of one handler invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid params: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error("document not in the model: {0}")]
    UnknownDocument(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

/// A stateless capability implementation.
pub trait CapabilityHandler: Send + Sync {
    fn handle(
        &self,
        params: &Value,
        ctx: &Context,
        cancel: &CancellationToken,
    ) -> Result<Value, HandlerError>;
}

impl<F> CapabilityHandler for F
where
    F: Fn(&Value, &Context, &CancellationToken) -> Result<Value, HandlerError> + Send + Sync,
{
    fn handle(
        &self,
        params: &Value,
        ctx: &Context,
        cancel: &CancellationToken,
    ) -> Result<Value, HandlerError> {
        self(params, ctx, cancel)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentPositionParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentParams {
    pub text_document: TextDocumentIdentifier,
}

pub(crate) fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T, HandlerError> {
    Ok(T::deserialize(params)?)
}

/// Declarations named by the identifier under the cursor, same document first.
///
/// A `::`-qualified name resolves exactly when possible and falls back to its
/// last segment otherwise.
pub(crate) fn declarations_at<'a>(
    ctx: &'a Context,
    uri: &str,
    position: Position,
) -> Result<Vec<SymbolRef<'a>>, HandlerError> {
    let document = ctx.document(uri)?;

    let word = match qualified_name_at(&document.text, position) {
        Some(qualified) => {
            if let Some(found) = ctx.model.lookup_qualified(&qualified) {
                return Ok(vec![found]);
            }
            let last = qualified.rsplit("::").next().unwrap_or_default();
            last.to_string()
        }
        None => match word_at(&document.text, position) {
            Some(word) => word,
            None => return Ok(Vec::new()),
        },
    };

    let mut found: Vec<SymbolRef<'a>> = ctx.model.lookup_simple(&word).collect();
    found.sort_by_key(|r| r.document.uri != uri);
    Ok(found)
}

pub(crate) fn check_cancelled(cancel: &CancellationToken) -> Result<(), HandlerError> {
    if cancel.is_cancelled() {
        return Err(HandlerError::Cancelled);
    }
    Ok(())
}

/// The built-in handlers, one per [`Capability::BUILTIN`] entry.
pub fn default_handlers() -> Vec<(Capability, Arc<dyn CapabilityHandler>)> {
    fn entry<H: CapabilityHandler + 'static>(
        capability: Capability,
        handler: H,
    ) -> (Capability, Arc<dyn CapabilityHandler>) {
        (capability, Arc::new(handler))
    }

    vec![
        entry(Capability::Completion, completion::handle),
        entry(Capability::Hover, hover::handle),
        entry(Capability::Definition, goto::handle),
        entry(Capability::Formatting, formatting::handle),
        entry(Capability::DocumentSymbol, symbols::handle),
    ]
}
