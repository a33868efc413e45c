//! Hover information implementation.

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::{
    Context, HandlerError, TextDocumentPositionParams, check_cancelled, declarations_at,
    parse_params,
};
use crate::base::{Position, Span};
use crate::model::{SymbolOrigin, SymbolRef};

/// Result of a hover request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// Markdown content to display.
    pub contents: String,
    /// Range of the hovered declaration.
    pub span: Span,
}

impl HoverResult {
    pub fn to_lsp(&self) -> Value {
        json!({
            "contents": { "kind": "markdown", "value": self.contents },
            "range": self.span,
        })
    }
}

/// Get hover information for the identifier at a position.
pub fn hover(ctx: &Context, uri: &str, position: Position) -> Result<Option<HoverResult>, HandlerError> {
    let declarations = declarations_at(ctx, uri, position)?;
    Ok(declarations.first().map(|found| HoverResult {
        contents: build_hover_content(found),
        span: found.symbol.span,
    }))
}

fn build_hover_content(found: &SymbolRef<'_>) -> String {
    let symbol = found.symbol;
    let mut content = format!("```sysml\n{} {}\n```\n", symbol.keyword, symbol.name);

    if *symbol.qualified_name != *symbol.name {
        content.push_str(&format!("\n**Qualified Name:** `{}`\n", symbol.qualified_name));
    }

    let origin = match found.origin {
        SymbolOrigin::Workspace => "workspace",
        SymbolOrigin::Library => "library",
    };
    content.push_str(&format!(
        "\n*{}* in {} `{}`\n",
        symbol.kind.display(),
        origin,
        found.document.uri
    ));
    content
}

pub(super) fn handle(
    params: &Value,
    ctx: &Context,
    cancel: &CancellationToken,
) -> Result<Value, HandlerError> {
    let params: TextDocumentPositionParams = parse_params(params)?;
    check_cancelled(cancel)?;

    let result = hover(ctx, &params.text_document.uri, params.position)?;
    Ok(result.map_or(Value::Null, |h| h.to_lsp()))
}
