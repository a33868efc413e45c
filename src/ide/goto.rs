//! Go-to-definition implementation.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::{
    Context, HandlerError, TextDocumentPositionParams, check_cancelled, declarations_at,
    parse_params,
};
use crate::base::{Position, Span};
use crate::engine::SymbolKind;
use crate::model::SymbolRef;

/// Result of a go-to-definition request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GotoResult {
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// LSP `Location[]`.
    pub fn to_lsp(&self) -> Value {
        Value::Array(
            self.targets
                .iter()
                .map(|t| json!({ "uri": t.uri, "range": t.span }))
                .collect(),
        )
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub uri: String,
    pub span: Span,
    pub kind: SymbolKind,
    pub name: Arc<str>,
}

impl From<&SymbolRef<'_>> for GotoTarget {
    fn from(found: &SymbolRef<'_>) -> Self {
        Self {
            uri: found.document.uri.clone(),
            span: found.symbol.span,
            kind: found.symbol.kind,
            name: Arc::clone(&found.symbol.name),
        }
    }
}

/// Every declaration of the name under the cursor: the same document first,
/// then the workspace, then the library.
pub fn goto_definition(
    ctx: &Context,
    uri: &str,
    position: Position,
) -> Result<GotoResult, HandlerError> {
    let targets = declarations_at(ctx, uri, position)?
        .iter()
        .map(GotoTarget::from)
        .collect();
    Ok(GotoResult { targets })
}

pub(super) fn handle(
    params: &Value,
    ctx: &Context,
    cancel: &CancellationToken,
) -> Result<Value, HandlerError> {
    let params: TextDocumentPositionParams = parse_params(params)?;
    check_cancelled(cancel)?;

    Ok(goto_definition(ctx, &params.text_document.uri, params.position)?.to_lsp())
}
