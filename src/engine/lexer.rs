//! Logos-based lexer for the structural engine
//!
//! Recognises just enough of SysML/KerML to find declarations and check
//! brace, string and comment structure.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `package`, `library`, `namespace`
    PackageKw,
    /// Declaring keywords such as `part`, `attribute`, `class`
    DeclKw,
    /// `def`
    DefKw,
    /// `import`
    ImportKw,
    /// `alias`
    AliasKw,
    Ident,
    /// `'unrestricted name'`
    QuotedName,
    Number,
    /// `"..."`; `closed` is false when the line ended first
    String { closed: bool },
    LineComment,
    /// `/* ... */`; `closed` is false when the input ended first
    BlockComment { closed: bool },
    LBrace,
    RBrace,
    Punct,
    Error,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment { .. })
    }
}

/// A token with its kind, text, and byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::new(span.start as u32),
            TextSize::new(span.end as u32),
        );

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token {
            kind,
            text: self.inner.slice(),
            range,
        })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Every keyword the lexer recognises, in completion order.
pub const KEYWORDS: &[&str] = &[
    "package",
    "library",
    "namespace",
    "import",
    "alias",
    "def",
    "part",
    "attribute",
    "port",
    "item",
    "action",
    "state",
    "requirement",
    "constraint",
    "connection",
    "interface",
    "enum",
    "calc",
    "occurrence",
    "class",
    "datatype",
    "struct",
    "feature",
    "classifier",
    "function",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    Closed,
    Unclosed,
}

fn string_literal(lex: &mut logos::Lexer<LogosToken>) -> Termination {
    let rest = lex.remainder();
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            '\n' => {
                lex.bump(i);
                return Termination::Unclosed;
            }
            '\\' if !escaped => {
                escaped = true;
                continue;
            }
            '"' if !escaped => {
                lex.bump(i + 1);
                return Termination::Closed;
            }
            _ => {}
        }
        escaped = false;
    }
    lex.bump(rest.len());
    Termination::Unclosed
}

fn block_comment(lex: &mut logos::Lexer<LogosToken>) -> Termination {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Termination::Closed
        }
        None => {
            lex.bump(rest.len());
            Termination::Unclosed
        }
    }
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum LogosToken {
    #[token("package")]
    #[token("library")]
    #[token("namespace")]
    PackageKw,

    #[token("part")]
    #[token("attribute")]
    #[token("port")]
    #[token("item")]
    #[token("action")]
    #[token("state")]
    #[token("requirement")]
    #[token("constraint")]
    #[token("connection")]
    #[token("interface")]
    #[token("enum")]
    #[token("calc")]
    #[token("occurrence")]
    #[token("class")]
    #[token("datatype")]
    #[token("struct")]
    #[token("feature")]
    #[token("classifier")]
    #[token("function")]
    DeclKw,

    #[token("def")]
    DefKw,

    #[token("import")]
    ImportKw,

    #[token("alias")]
    AliasKw,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"'[^'\n]*'")]
    QuotedName,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[token("\"", string_literal)]
    String(Termination),

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment(Termination),

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(";")]
    #[token(":")]
    #[token("::")]
    #[token(":>")]
    #[token(":>>")]
    #[token("=")]
    #[token(",")]
    #[token(".")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token("*")]
    #[token("~")]
    #[token("#")]
    #[token("@")]
    Punct,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::PackageKw => TokenKind::PackageKw,
            LogosToken::DeclKw => TokenKind::DeclKw,
            LogosToken::DefKw => TokenKind::DefKw,
            LogosToken::ImportKw => TokenKind::ImportKw,
            LogosToken::AliasKw => TokenKind::AliasKw,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::QuotedName => TokenKind::QuotedName,
            LogosToken::Number => TokenKind::Number,
            LogosToken::String(t) => TokenKind::String {
                closed: t == Termination::Closed,
            },
            LogosToken::LineComment => TokenKind::LineComment,
            LogosToken::BlockComment(t) => TokenKind::BlockComment {
                closed: t == Termination::Closed,
            },
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::Punct => TokenKind::Punct,
        }
    }
}
