//! Token kinds and tokens
//!
//! The literal kinds are recognized by `logos`. `Indent`, `Dedent` and `Eof`
//! have no pattern: they are synthesized by the lexers themselves.

use logos::Logos;
use offside_error::span::{Position, Span, Spanned};
use serde::Serialize;
use std::fmt;

/// Every kind of token a source unit can produce
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // =========================================
    // Layout
    // =========================================
    /// Run of spaces and tabs
    #[regex(r"[ \t]+")]
    Whitespace,
    #[regex(r"\r\n|\n|\r")]
    Newline,
    /// `#` up to the end of the line
    #[regex(r"#[^\r\n]*")]
    Comment,

    // =========================================
    // Literals and names
    // =========================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+")]
    Float,
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\r\n]|\\.)*'"#)]
    Str,

    // =========================================
    // Operators
    // =========================================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("!")]
    Not,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,

    // =========================================
    // Punctuation
    // =========================================
    #[token("->")]
    Arrow,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // =========================================
    // Synthetic
    // =========================================
    /// Opens a block
    Indent,
    /// Closes the innermost block
    Dedent,
    /// End of the source unit
    Eof,
    /// Input the raw lexer could not recognize
    Error,
}

impl TokenKind {
    pub fn is_open_bracket(self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace)
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace)
    }

    /// Whitespace and comments, which never reach a parser
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Kinds that carry no source text of their own
    pub fn is_synthetic(self) -> bool {
        matches!(self, TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof)
    }

    /// Fixed spelling, for kinds that have one
    pub fn symbol(self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Not => "!",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::Arrow => "->",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            _ => return None,
        };
        Some(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return write!(f, "`{}`", symbol);
        }
        let name = match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Str => "string literal",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Eof => "EOF",
            _ => "invalid token",
        };
        f.write_str(name)
    }
}

/// A token with its text and location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; empty for synthetic tokens
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Text-less token anchored at `pos`
    pub fn synthetic(kind: TokenKind, pos: Position, file_id: u32) -> Self {
        Self {
            kind,
            text: String::new(),
            span: Span::point(pos, file_id),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn column(&self) -> u32 {
        self.span.start.column
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident | TokenKind::Int | TokenKind::Float | TokenKind::Str => write!(
                f,
                "{} `{}` at {}:{}",
                self.kind,
                self.text,
                self.line(),
                self.column()
            ),
            _ => write!(f, "{} at {}:{}", self.kind, self.line(), self.column()),
        }
    }
}
