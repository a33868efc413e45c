//! Completion suggestions implementation.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::{Context, HandlerError, TextDocumentPositionParams, check_cancelled, parse_params};
use crate::base::Position;
use crate::core::text_utils::prefix_at;
use crate::engine::SymbolKind;
use crate::engine::lexer::KEYWORDS;
use crate::model::{SymbolOrigin, SymbolRef};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Package,
    Definition,
    Usage,
    Keyword,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Package => 9,    // Module
            CompletionKind::Definition => 7, // Class
            CompletionKind::Usage => 5,      // Field
            CompletionKind::Keyword => 14,   // Keyword
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            sort_priority: 100,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    fn from_symbol(symbol_ref: &SymbolRef<'_>, priority: u32) -> Self {
        let symbol = symbol_ref.symbol;
        let kind = match symbol.kind {
            SymbolKind::Package => CompletionKind::Package,
            SymbolKind::Definition => CompletionKind::Definition,
            SymbolKind::Usage | SymbolKind::Alias => CompletionKind::Usage,
        };
        Self::new(Arc::clone(&symbol.name), kind)
            .with_detail(Arc::clone(&symbol.qualified_name))
            .with_priority(priority)
    }

    pub fn to_lsp(&self) -> Value {
        let mut item = json!({
            "label": &*self.label,
            "kind": self.kind.to_lsp(),
            "sortText": format!("{:04}_{}", self.sort_priority, self.label),
        });
        if let Some(detail) = &self.detail {
            item["detail"] = json!(&**detail);
        }
        item
    }
}

const SAME_FILE_PRIORITY: u32 = 10;
const WORKSPACE_PRIORITY: u32 = 20;
const LIBRARY_PRIORITY: u32 = 30;
const KEYWORD_PRIORITY: u32 = 50;

/// Get completion suggestions at a position.
///
/// Symbols declared in the same document come first, then the rest of the
/// workspace, then the library, then keywords. Labels are unique and the list
/// is capped at `thresholds.maxCompletionItems`.
pub fn completions(
    ctx: &Context,
    uri: &str,
    position: Position,
) -> Result<Vec<CompletionItem>, HandlerError> {
    let document = ctx.document(uri)?;
    let prefix = prefix_at(&document.text, position);

    let mut items: Vec<CompletionItem> = ctx
        .model
        .symbols()
        .filter(|r| r.symbol.name.starts_with(prefix.as_str()))
        .map(|r| {
            let priority = match r.origin {
                SymbolOrigin::Workspace if r.document.uri == uri => SAME_FILE_PRIORITY,
                SymbolOrigin::Workspace => WORKSPACE_PRIORITY,
                SymbolOrigin::Library => LIBRARY_PRIORITY,
            };
            CompletionItem::from_symbol(&r, priority)
        })
        .collect();

    items.extend(
        KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(prefix.as_str()))
            .map(|kw| CompletionItem::new(*kw, CompletionKind::Keyword).with_priority(KEYWORD_PRIORITY)),
    );

    // Stable: equal priorities keep model order.
    items.sort_by_key(|item| item.sort_priority);

    let mut seen = FxHashSet::default();
    items.retain(|item| seen.insert(Arc::clone(&item.label)));
    items.truncate(ctx.config.thresholds.max_completion_items);

    Ok(items)
}

pub(super) fn handle(
    params: &Value,
    ctx: &Context,
    cancel: &CancellationToken,
) -> Result<Value, HandlerError> {
    let params: TextDocumentPositionParams = parse_params(params)?;
    check_cancelled(cancel)?;

    let items = completions(ctx, &params.text_document.uri, params.position)?;
    Ok(Value::Array(items.iter().map(CompletionItem::to_lsp).collect()))
}
