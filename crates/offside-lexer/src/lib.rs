//! offside-lexer - tokenizer and off-side rule transducer
//!
//! Two stages, both pulled one token at a time through [`TokenSource`]:
//!
//! - [`RawLexer`] turns source text into tokens, layout included
//!   (whitespace, comments, newlines).
//! - [`IndentLexer`] wraps any [`TokenSource`] and replaces layout with
//!   explicit `Indent`/`Dedent` tokens, so a parser can treat blocks like
//!   bracketed groups.
//!
//! # Example
//!
//! ```rust
//! use offside_lexer::{IndentLexer, RawLexer, TokenKind};
//!
//! let source = "if ready:\n    go()\nstop()\n";
//!
//! let mut lexer = IndentLexer::new(RawLexer::new(source, 0));
//! let kinds: Vec<TokenKind> = lexer
//!     .tokenize()
//!     .unwrap()
//!     .into_iter()
//!     .map(|t| t.kind)
//!     .collect();
//!
//! assert_eq!(kinds[3], TokenKind::Indent);
//! assert!(kinds.contains(&TokenKind::Dedent));
//! ```

pub mod config;
pub mod error;
pub mod indent;
pub mod lexer;
pub mod source;
pub mod token;

pub use config::{
    ConfigError, IndentConfig, IndentStyle, StylePolicy, DEFAULT_TAB_WIDTH, MAX_TAB_WIDTH,
};
pub use error::LexError;
pub use indent::{IndentLexer, IndentStack};
pub use lexer::{tokenize_raw, RawLexer};
pub use source::{TokenBuffer, TokenSource};
pub use token::{Token, TokenKind};

use offside_error::Diagnostics;
use tracing::debug;

/// Lexes a source unit into its block-structured token stream.
///
/// Raw lexing problems are reported but do not stop the stream. An
/// indentation error ends it: the returned tokens stop where the error was
/// found, and the error is reported as the last diagnostic.
pub fn tokenize(source: &str, file_id: u32) -> (Vec<Token>, Diagnostics) {
    tokenize_unit(source, file_id, &IndentConfig::default())
}

/// [`tokenize`] with an explicit configuration
pub fn tokenize_unit(
    source: &str,
    file_id: u32,
    config: &IndentConfig,
) -> (Vec<Token>, Diagnostics) {
    let mut lexer = IndentLexer::with_config(RawLexer::new(source, file_id), config.clone());
    let mut tokens = Vec::new();
    let mut failure = None;

    for item in lexer.by_ref() {
        match item {
            Ok(token) => tokens.push(token),
            Err(err) => failure = Some(err),
        }
    }
    debug!(
        file_id,
        tokens = tokens.len(),
        tab_width = lexer.config().tab_width,
        style = ?lexer.style(),
        failed = failure.is_some(),
        "unit tokenized"
    );

    let mut diagnostics = lexer.upstream_mut().take_diagnostics();
    if let Some(err) = failure {
        diagnostics.push(err.to_diagnostic());
    }
    (tokens, diagnostics)
}

/// Lexes a source unit with an explicit configuration.
///
/// Raw lexing problems end up as `TokenKind::Error` tokens; use
/// [`RawLexer::take_diagnostics`] through [`IndentLexer::upstream_mut`] when
/// they need reporting.
pub fn tokenize_with(
    source: &str,
    file_id: u32,
    config: &IndentConfig,
) -> Result<Vec<Token>, LexError> {
    IndentLexer::with_config(RawLexer::new(source, file_id), config.clone()).tokenize()
}
