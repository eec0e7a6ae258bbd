//! The pull interface shared by every stage of the token pipeline

use crate::error::LexError;
use crate::token::{Token, TokenKind};
use offside_error::span::Position;

/// Something a parser can pull tokens from, one at a time.
///
/// Implementations return an [`TokenKind::Eof`] token once the input is
/// exhausted, and keep returning it on later calls.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, LexError>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Result<Token, LexError> {
        (**self).next_token()
    }
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        (**self).next_token()
    }
}

/// Replays an already-lexed token vector
#[derive(Debug)]
pub struct TokenBuffer {
    tokens: std::vec::IntoIter<Token>,
    eof: Token,
}

impl TokenBuffer {
    /// Tokens after the first `Eof` are never replayed. Without an `Eof`, one
    /// is synthesized where the last token ends.
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens
            .iter()
            .find(|t| t.is_eof())
            .cloned()
            .unwrap_or_else(|| match tokens.last() {
                Some(last) => Token::synthetic(TokenKind::Eof, last.span.end, last.span.file_id),
                None => Token::synthetic(TokenKind::Eof, Position::origin(), 0),
            });

        Self {
            tokens: tokens.into_iter(),
            eof,
        }
    }
}

impl TokenSource for TokenBuffer {
    fn next_token(&mut self) -> Result<Token, LexError> {
        match self.tokens.next() {
            Some(token) if !token.is_eof() => Ok(token),
            _ => {
                // drop anything queued behind the end marker
                self.tokens = Vec::new().into_iter();
                Ok(self.eof.clone())
            }
        }
    }
}
