//! Structural engine: declarations and brace/string/comment structure.
//!
//! It is not a SysML parser. It finds `package`/`part def`/`attribute`-style
//! declarations, tracks nesting through braces to build qualified names, and
//! reports structural problems.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::TextRange;

use super::lexer::{Token, TokenKind, tokenize};
use super::{EngineError, LanguageEngine, ParsedDocument, Problem, Symbol, SymbolKind};
use crate::base::LineIndex;

const UNMATCHED_CLOSE: &str = "S001";
const UNCLOSED_OPEN: &str = "S002";
const UNTERMINATED_STRING: &str = "S003";
const UNTERMINATED_COMMENT: &str = "S004";
const UNEXPECTED_CHARACTER: &str = "S005";
const DUPLICATE_DECLARATION: &str = "S006";

/// Built-in engine used when no richer engine is plugged in.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralEngine;

impl StructuralEngine {
    pub fn new() -> Self {
        Self
    }
}

struct Scope {
    name: Option<Arc<str>>,
    open: TextRange,
}

struct Analysis<'a> {
    text: &'a str,
    line_index: LineIndex,
    scopes: Vec<Scope>,
    /// Name of the last declaration, waiting for a `{` to open its body.
    pending_scope: Option<Arc<str>>,
    seen: FxHashSet<Arc<str>>,
    symbols: Vec<Symbol>,
    problems: Vec<Problem>,
}

impl<'a> Analysis<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            line_index: LineIndex::new(text),
            scopes: Vec::new(),
            pending_scope: None,
            seen: FxHashSet::default(),
            symbols: Vec::new(),
            problems: Vec::new(),
        }
    }

    fn error(&mut self, range: TextRange, code: &str, message: impl Into<String>) {
        let span = self.line_index.span(self.text, range);
        self.problems.push(Problem::error(span, code, message));
    }

    fn container(&self) -> Option<Arc<str>> {
        let names: Vec<&str> = self
            .scopes
            .iter()
            .filter_map(|s| s.name.as_deref())
            .collect();
        (!names.is_empty()).then(|| Arc::from(names.join("::")))
    }

    fn declare(&mut self, name_token: &Token<'_>, kind: SymbolKind, keyword: SmolStr) {
        let name: Arc<str> = Arc::from(name_token.text.trim_matches('\''));
        let container = self.container();
        let qualified_name: Arc<str> = match &container {
            Some(parent) => Arc::from(format!("{parent}::{name}")),
            None => Arc::clone(&name),
        };
        let span = self.line_index.span(self.text, name_token.range);

        if !self.seen.insert(Arc::clone(&qualified_name)) {
            self.problems.push(Problem::warning(
                span,
                DUPLICATE_DECLARATION,
                format!("duplicate declaration of `{qualified_name}`"),
            ));
        }

        self.pending_scope = Some(Arc::clone(&name));
        self.symbols.push(Symbol {
            name,
            qualified_name,
            kind,
            keyword,
            span,
            container,
        });
    }

    fn run(mut self, tokens: &[Token<'_>]) -> (Vec<Symbol>, Vec<Problem>) {
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::PackageKw | TokenKind::AliasKw => {
                    let kind = if token.kind == TokenKind::PackageKw {
                        SymbolKind::Package
                    } else {
                        SymbolKind::Alias
                    };
                    if let Some(name) = tokens.get(i + 1).filter(|t| is_name(t.kind)) {
                        self.declare(name, kind, SmolStr::new(token.text));
                        i += 1;
                    }
                }
                TokenKind::DeclKw => {
                    let has_def = tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::DefKw);
                    let name_at = if has_def { i + 2 } else { i + 1 };
                    let keyword = if has_def {
                        SmolStr::new(format!("{} def", token.text))
                    } else {
                        SmolStr::new(token.text)
                    };
                    let kind = if has_def {
                        SymbolKind::Definition
                    } else {
                        SymbolKind::Usage
                    };
                    match tokens.get(name_at).filter(|t| is_name(t.kind)) {
                        Some(name) => {
                            self.declare(name, kind, keyword);
                            i = name_at;
                        }
                        None => self.pending_scope = None,
                    }
                }
                TokenKind::LBrace => {
                    let name = self.pending_scope.take();
                    self.scopes.push(Scope {
                        name,
                        open: token.range,
                    });
                }
                TokenKind::RBrace => {
                    self.pending_scope = None;
                    if self.scopes.pop().is_none() {
                        self.error(token.range, UNMATCHED_CLOSE, "unmatched `}`");
                    }
                }
                TokenKind::Punct if token.text == ";" => self.pending_scope = None,
                TokenKind::String { closed: false } => {
                    self.error(token.range, UNTERMINATED_STRING, "unterminated string literal");
                }
                TokenKind::BlockComment { closed: false } => {
                    self.error(token.range, UNTERMINATED_COMMENT, "unterminated block comment");
                }
                TokenKind::Error => {
                    let message = format!("unexpected character `{}`", token.text);
                    self.error(token.range, UNEXPECTED_CHARACTER, message);
                }
                _ => {}
            }
            i += 1;
        }

        for scope in std::mem::take(&mut self.scopes) {
            let message = match &scope.name {
                Some(name) => format!("unclosed `{{` for `{name}`"),
                None => "unclosed `{`".to_string(),
            };
            self.error(scope.open, UNCLOSED_OPEN, message);
        }

        (self.symbols, self.problems)
    }
}

fn is_name(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Ident | TokenKind::QuotedName)
}

impl LanguageEngine for StructuralEngine {
    fn name(&self) -> &str {
        "structural"
    }

    fn parse(&self, uri: &str, version: i32, text: &str) -> Result<ParsedDocument, EngineError> {
        let tokens: Vec<Token<'_>> = tokenize(text)
            .into_iter()
            .filter(|t| !t.kind.is_trivia() || matches!(t.kind, TokenKind::BlockComment { closed: false }))
            .collect();

        let analysis = Analysis::new(text);
        let line_index = analysis.line_index.clone();
        let (symbols, problems) = analysis.run(&tokens);

        tracing::trace!(
            uri,
            symbols = symbols.len(),
            problems = problems.len(),
            "structural analysis"
        );

        Ok(ParsedDocument {
            uri: uri.to_string(),
            version,
            text: Arc::from(text),
            line_index,
            symbols,
            problems,
        })
    }
}
