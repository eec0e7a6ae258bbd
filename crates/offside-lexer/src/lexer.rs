//! Raw, whitespace-oblivious tokenizer
//!
//! Produces every token of the source, layout included: whitespace runs,
//! comments and newlines come out as ordinary tokens. Block structure is the
//! business of [`crate::indent::IndentLexer`].

use crate::error::LexError;
use crate::source::TokenSource;
use crate::token::{Token, TokenKind};
use logos::Logos;
use offside_error::{
    span::{Position, Span},
    Diagnostic, Diagnostics, ErrorCode,
};

/// Raw lexer over a single source unit
pub struct RawLexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    file_id: u32,
    /// Line of the next token (1-indexed)
    line: u32,
    /// Byte offset at which `line` begins
    line_start: usize,
    /// Non-fatal problems, such as unexpected characters
    diagnostics: Diagnostics,
}

impl<'src> RawLexer<'src> {
    pub fn new(source: &'src str, file_id: u32) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            file_id,
            line: 1,
            line_start: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Position of a byte offset on the current line
    fn position_at(&self, offset: usize) -> Position {
        let chars = self.source[self.line_start..offset].chars().count();
        let column = u32::try_from(chars).unwrap_or(u32::MAX).saturating_add(1);
        Position::new(self.line, column, offset)
    }

    /// Reads the next raw token; `Eof` once the input is exhausted
    pub fn next_raw(&mut self) -> Token {
        let Some(result) = self.inner.next() else {
            let end = self.position_at(self.source.len());
            return Token::synthetic(TokenKind::Eof, end, self.file_id);
        };

        let range = self.inner.span();
        let text = self.inner.slice();
        let span = Span::new(
            self.position_at(range.start),
            self.position_at(range.end),
            self.file_id,
        );

        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                self.diagnostics.push(
                    Diagnostic::error(format!("unexpected character: {:?}", text))
                        .with_code(ErrorCode::UNEXPECTED_CHAR)
                        .with_label(span, "not part of any token"),
                );
                TokenKind::Error
            }
        };

        if kind == TokenKind::Newline {
            self.line += 1;
            self.line_start = range.end;
        }

        Token::new(kind, text, span)
    }

    /// Lexes the whole unit, ending with the `Eof` token
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_raw();
            let is_eof = token.is_eof();
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        tokens
    }
}

impl TokenSource for RawLexer<'_> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        Ok(self.next_raw())
    }
}

/// Lexes a source unit without any indentation processing
pub fn tokenize_raw(source: &str, file_id: u32) -> (Vec<Token>, Diagnostics) {
    let mut lexer = RawLexer::new(source, file_id);
    let tokens = lexer.tokenize();
    (tokens, lexer.take_diagnostics())
}
