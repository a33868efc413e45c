//! Document formatting: re-indentation by brace depth.
//!
//! Only leading whitespace changes. Continuation lines of block comments are
//! left untouched, blank lines lose their whitespace, and every other line is
//! indented by its brace depth (a line opening with `}` is dedented first).
//!
//! Indentation comes from the bound `ClientConfiguration::formatting`; the
//! `options` a client attaches to each formatting request are ignored.

use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::{Context, HandlerError, TextDocumentIdentifier, check_cancelled, parse_params};
use crate::base::{LineIndex, Span};
use crate::config::FormattingOptions;
use crate::engine::lexer::{TokenKind, tokenize};

/// A replacement of `range` by `new_text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn to_lsp(&self) -> Value {
        json!({ "range": self.range, "newText": self.new_text })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFormattingParams {
    text_document: TextDocumentIdentifier,
}

/// Re-indent `text`. Returns `None` if cancelled part-way.
pub fn format_document(
    text: &str,
    options: &FormattingOptions,
    cancel: &CancellationToken,
) -> Option<String> {
    let line_index = LineIndex::new(text);
    let line_count = line_index.line_count();

    // Net brace change per line; lines inside a multi-line comment stay as written.
    let mut delta = vec![0i32; line_count];
    let mut verbatim = vec![false; line_count];
    for token in tokenize(text) {
        let line = line_index.position(text, token.range.start()).line;
        match token.kind {
            TokenKind::LBrace => delta[line] += 1,
            TokenKind::RBrace => delta[line] -= 1,
            TokenKind::BlockComment { .. } => {
                let end = line_index.position(text, token.range.end()).line;
                for flag in verbatim.iter_mut().take(end + 1).skip(line + 1) {
                    *flag = true;
                }
            }
            _ => {}
        }
    }

    let unit = options.indent_unit();
    let ending = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut depth = 0i32;
    let mut lines = Vec::with_capacity(line_count);

    for (i, raw) in text.split('\n').enumerate() {
        if cancel.is_cancelled() {
            return None;
        }
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim();

        if verbatim[i] {
            lines.push(line.to_string());
        } else if trimmed.is_empty() {
            lines.push(String::new());
        } else {
            let level = (if trimmed.starts_with('}') { depth - 1 } else { depth }).max(0);
            lines.push(format!("{}{trimmed}", unit.repeat(level as usize)));
        }

        depth = (depth + delta[i]).max(0);
    }

    Some(lines.join(ending))
}

pub(super) fn handle(
    params: &Value,
    ctx: &Context,
    cancel: &CancellationToken,
) -> Result<Value, HandlerError> {
    let params: DocumentFormattingParams = parse_params(params)?;
    check_cancelled(cancel)?;

    let document = ctx.document(&params.text_document.uri)?;
    let formatted = format_document(&document.text, &ctx.config.formatting, cancel).ok_or(HandlerError::Cancelled)?;

    if formatted == *document.text {
        return Ok(json!([]));
    }
    let edit = TextEdit {
        range: document.line_index.full_span(&document.text),
        new_text: formatted,
    };
    Ok(json!([edit.to_lsp()]))
}
