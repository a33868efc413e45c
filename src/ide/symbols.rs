//! Symbol listing for the document outline.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::{Context, DocumentParams, HandlerError, check_cancelled, parse_params};
use crate::base::Span;
use crate::engine::{Symbol, SymbolKind};

/// A symbol for the document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: Arc<str>,
    /// Qualified name (for grouping/hierarchy).
    pub qualified_name: Arc<str>,
    pub kind: SymbolKind,
    pub uri: String,
    pub span: Span,
}

impl SymbolInfo {
    fn from_symbol(uri: &str, symbol: &Symbol) -> Self {
        Self {
            name: Arc::clone(&symbol.name),
            qualified_name: Arc::clone(&symbol.qualified_name),
            kind: symbol.kind,
            uri: uri.to_string(),
            span: symbol.span,
        }
    }

    /// Get the container name (parent path) for hierarchy building.
    pub fn container_name(&self) -> Option<&str> {
        let qname = self.qualified_name.as_ref();
        qname.rfind("::").map(|idx| &qname[..idx])
    }

    /// LSP `SymbolInformation`.
    pub fn to_lsp(&self) -> Value {
        let mut info = json!({
            "name": &*self.name,
            "kind": self.kind.to_lsp_symbol(),
            "location": { "uri": self.uri, "range": self.span },
        });
        if let Some(container) = self.container_name() {
            info["containerName"] = json!(container);
        }
        info
    }
}

/// Declarations of one document, in source order.
pub fn document_symbols(ctx: &Context, uri: &str) -> Result<Vec<SymbolInfo>, HandlerError> {
    let document = ctx.document(uri)?;
    Ok(document
        .symbols
        .iter()
        .map(|s| SymbolInfo::from_symbol(&document.uri, s))
        .collect())
}

pub(super) fn handle(
    params: &Value,
    ctx: &Context,
    cancel: &CancellationToken,
) -> Result<Value, HandlerError> {
    let params: DocumentParams = parse_params(params)?;
    check_cancelled(cancel)?;

    let symbols = document_symbols(ctx, &params.text_document.uri)?;
    Ok(Value::Array(symbols.iter().map(SymbolInfo::to_lsp).collect()))
}
