//! Off-side rule transducer
//!
//! [`IndentLexer`] wraps any [`TokenSource`] that reports layout (whitespace
//! runs, comments and newlines) and turns it into a stream a block-structured
//! grammar can consume directly: layout is dropped, and every change of
//! indentation between two content lines becomes explicit `Indent` and
//! `Dedent` tokens.
//!
//! ```text
//! if x:          Ident Ident Colon
//!     y          Indent Ident
//!     if z:      Ident Ident Colon
//!         w      Indent Ident
//! v              Dedent Dedent Ident
//!                Eof
//! ```
//!
//! Blank and comment-only lines never affect the block structure, and neither
//! does the indentation of lines that continue an open `(`, `[` or `{`.

use crate::config::{IndentConfig, IndentStyle};
use crate::error::LexError;
use crate::source::TokenSource;
use crate::token::{Token, TokenKind};
use offside_error::span::{Position, Span};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Widths of the open blocks, innermost on top.
///
/// Strictly increasing from the bottom, which is always 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentStack {
    levels: Vec<u32>,
}

impl IndentStack {
    pub fn new() -> Self {
        Self { levels: vec![0] }
    }

    pub fn top(&self) -> u32 {
        self.levels.last().copied().unwrap_or(0)
    }

    /// Number of open blocks
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    pub fn contains(&self, width: u32) -> bool {
        self.levels.binary_search(&width).is_ok()
    }

    fn push(&mut self, width: u32) {
        debug_assert!(width > self.top());
        self.levels.push(width);
    }

    /// Closes the innermost block; the bottom level is never popped
    fn pop(&mut self) -> Option<u32> {
        if self.levels.len() > 1 {
            self.levels.pop()
        } else {
            None
        }
    }
}

impl Default for IndentStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-unit bookkeeping of the transducer
#[derive(Debug, Clone)]
struct LexerState {
    /// Open `(`, `[` and `{` not yet closed
    bracket_depth: u32,
    /// Set by a newline outside brackets, cleared by the next content token
    at_line_start: bool,
    /// Fixed by the first indented content line, whose span is kept
    style: Option<(IndentStyle, Span)>,
    /// Content was forwarded since the last logical NEWLINE
    line_open: bool,
    /// Newline that ended the last content line, kept for `emit_newlines`
    last_newline: Option<Token>,
    /// Set once end of input has been reached
    eof: Option<Token>,
}

impl LexerState {
    fn new() -> Self {
        Self {
            bracket_depth: 0,
            at_line_start: true,
            style: None,
            line_open: false,
            last_newline: None,
            eof: None,
        }
    }
}

/// INDENT/DEDENT transducer over an upstream [`TokenSource`]
///
/// Pull tokens with [`IndentLexer::next_token`] or iterate; both stop making
/// progress after `Eof` or the first [`LexError`].
pub struct IndentLexer<S> {
    upstream: S,
    config: IndentConfig,
    stack: IndentStack,
    /// Tokens already decided but not yet handed out
    pending: VecDeque<Token>,
    state: LexerState,
    failure: Option<LexError>,
    /// The iterator has yielded `Eof` or an error
    exhausted: bool,
}

impl<S: TokenSource> IndentLexer<S> {
    pub fn new(upstream: S) -> Self {
        Self::with_config(upstream, IndentConfig::default())
    }

    pub fn with_config(upstream: S, config: IndentConfig) -> Self {
        Self {
            upstream,
            config,
            stack: IndentStack::new(),
            pending: VecDeque::new(),
            state: LexerState::new(),
            failure: None,
            exhausted: false,
        }
    }

    pub fn config(&self) -> &IndentConfig {
        &self.config
    }

    /// Number of blocks currently open
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn indent_levels(&self) -> &[u32] {
        self.stack.levels()
    }

    /// Indentation style observed so far
    pub fn style(&self) -> Option<IndentStyle> {
        self.state.style.map(|(style, _)| style)
    }

    pub fn bracket_depth(&self) -> u32 {
        self.state.bracket_depth
    }

    /// End of input has been reached
    pub fn is_finished(&self) -> bool {
        self.state.eof.is_some()
    }

    pub fn upstream_mut(&mut self) -> &mut S {
        &mut self.upstream
    }

    /// Returns the next token of the block-structured stream.
    ///
    /// Once `Eof` has been returned it is returned again on every call; once
    /// an error has been returned, the same error is.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(token);
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if let Some(eof) = &self.state.eof {
            return Ok(eof.clone());
        }

        self.advance().map_err(|err| {
            warn!(line = err.line(), column = err.column(), "{}", err);
            self.pending.clear();
            self.failure = Some(err.clone());
            err
        })
    }

    /// Lexes the rest of the unit, ending with the `Eof` token
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn advance(&mut self) -> Result<Token, LexError> {
        loop {
            if self.state.at_line_start {
                return self.start_line();
            }

            let raw = self.upstream.next_token()?;
            match raw.kind {
                kind if kind.is_trivia() => continue,
                TokenKind::Newline => {
                    if self.state.bracket_depth == 0 {
                        self.state.at_line_start = true;
                        self.state.last_newline = Some(raw);
                    }
                }
                TokenKind::Eof => return Ok(self.finish(raw)),
                _ => return Ok(self.forward(raw)),
            }
        }
    }

    /// Skips blank and comment-only lines, then measures the first content
    /// line and decides which INDENT/DEDENT tokens precede it
    fn start_line(&mut self) -> Result<Token, LexError> {
        let mut leading = String::new();
        let mut line_start: Option<Position> = None;

        loop {
            let raw = self.upstream.next_token()?;
            match raw.kind {
                TokenKind::Whitespace => {
                    line_start.get_or_insert(raw.span.start);
                    leading.push_str(&raw.text);
                }
                TokenKind::Comment => {}
                TokenKind::Newline => {
                    trace!(line = raw.line(), "skipping blank line");
                    leading.clear();
                    line_start = None;
                }
                TokenKind::Eof => return Ok(self.finish(raw)),
                _ => {
                    self.state.at_line_start = false;
                    let span = Span::new(
                        line_start.unwrap_or(raw.span.start),
                        raw.span.start,
                        raw.span.file_id,
                    );
                    let width = self.measure(&leading, span)?;
                    self.reconcile(width, span)?;

                    let content = self.forward(raw);
                    return Ok(match self.pending.pop_front() {
                        Some(first) => {
                            self.pending.push_back(content);
                            first
                        }
                        None => content,
                    });
                }
            }
        }
    }

    /// Width of a content line's leading whitespace
    fn measure(&mut self, leading: &str, span: Span) -> Result<u32, LexError> {
        let has_tabs = leading.contains('\t');
        let has_spaces = leading.contains(' ');
        if has_tabs && has_spaces {
            return Err(LexError::MixedIndentChars { span });
        }

        // saturates for configs that skipped validation
        let width = leading.chars().fold(0u32, |width, ch| {
            let step = if ch == '\t' { self.config.tab_width } else { 1 };
            width.saturating_add(step)
        });
        if width == 0 {
            return Ok(0);
        }

        let found = if has_tabs {
            IndentStyle::Tabs
        } else {
            IndentStyle::Spaces
        };
        match self.state.style {
            None => {
                debug!(line = span.start.line, style = %found, "indentation style fixed");
                self.state.style = Some((found, span));
            }
            Some((expected, established)) if expected != found && self.config.is_strict() => {
                return Err(LexError::InconsistentIndentStyle {
                    span,
                    expected,
                    found,
                    established,
                });
            }
            Some(_) => {}
        }

        Ok(width)
    }

    /// Queues the synthetic tokens for a content line of `width`
    fn reconcile(&mut self, width: u32, span: Span) -> Result<(), LexError> {
        let top = self.stack.top();
        if width < top && !self.stack.contains(width) {
            return Err(LexError::UnmatchedDedent {
                span,
                width,
                levels: self.stack.levels().to_vec(),
            });
        }

        self.end_logical_line(span.end, span.file_id);

        let at = span.end;
        if width > top {
            self.stack.push(width);
            debug!(line = at.line, width, depth = self.stack.depth(), "indent");
            self.pending
                .push_back(Token::synthetic(TokenKind::Indent, at, span.file_id));
        } else {
            while self.stack.top() > width {
                self.stack.pop();
                self.pending
                    .push_back(Token::synthetic(TokenKind::Dedent, at, span.file_id));
            }
            if width < top {
                debug!(line = at.line, width, depth = self.stack.depth(), "dedent");
            }
        }

        Ok(())
    }

    /// Closes every open block and queues the end of the stream
    fn finish(&mut self, eof: Token) -> Token {
        self.end_logical_line(eof.span.start, eof.span.file_id);

        let closed = self.stack.depth();
        while self.stack.pop().is_some() {
            self.pending.push_back(Token::synthetic(
                TokenKind::Dedent,
                eof.span.start,
                eof.span.file_id,
            ));
        }
        debug!(line = eof.line(), closed, "end of input");

        self.state.eof = Some(eof.clone());
        match self.pending.pop_front() {
            Some(first) => {
                self.pending.push_back(eof);
                first
            }
            None => eof,
        }
    }

    /// Queues the NEWLINE ending the previous content line, if configured
    fn end_logical_line(&mut self, at: Position, file_id: u32) {
        if !(self.config.emit_newlines && self.state.line_open) {
            return;
        }
        self.state.line_open = false;

        let newline = self
            .state
            .last_newline
            .take()
            .unwrap_or_else(|| Token::synthetic(TokenKind::Newline, at, file_id));
        self.pending.push_back(newline);
    }

    /// Hands a content token through, tracking bracket nesting
    fn forward(&mut self, token: Token) -> Token {
        if token.kind.is_open_bracket() {
            self.state.bracket_depth += 1;
            trace!(depth = self.state.bracket_depth, "bracket opened");
        } else if token.kind.is_close_bracket() {
            // unbalanced closers are the parser's problem
            self.state.bracket_depth = self.state.bracket_depth.saturating_sub(1);
            trace!(depth = self.state.bracket_depth, "bracket closed");
        }
        self.state.line_open = true;
        token
    }
}

impl<S: TokenSource> TokenSource for IndentLexer<S> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        IndentLexer::next_token(self)
    }
}

impl<S: TokenSource> Iterator for IndentLexer<S> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let item = self.next_token();
        self.exhausted = match &item {
            Ok(token) => token.is_eof(),
            Err(_) => true,
        };
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StylePolicy;
    use crate::lexer::RawLexer;
    use pretty_assertions::assert_eq;

    fn lexer(source: &str, config: IndentConfig) -> IndentLexer<RawLexer<'_>> {
        IndentLexer::with_config(RawLexer::new(source, 0), config)
    }

    fn kinds_with(source: &str, config: IndentConfig) -> Result<Vec<TokenKind>, LexError> {
        let tokens = lexer(source, config).tokenize()?;
        Ok(tokens.into_iter().map(|t| t.kind).collect())
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        kinds_with(source, IndentConfig::default()).unwrap()
    }

    use TokenKind::{Colon, Dedent, Eof, Ident, Indent};

    #[test]
    fn test_simple_block() {
        assert_eq!(
            kinds("if x:\n    y\nz\n"),
            vec![Ident, Ident, Colon, Indent, Ident, Dedent, Ident, Eof]
        );
    }

    #[test]
    fn test_same_level_emits_nothing() {
        assert_eq!(kinds("a\nb\n  c\n  d\n"), vec![Ident, Ident, Indent, Ident, Ident, Dedent, Eof]);
    }

    #[test]
    fn test_two_dedents_in_one_transition() {
        assert_eq!(
            kinds("a\n    b\n        c\nd\n"),
            vec![Ident, Indent, Ident, Indent, Ident, Dedent, Dedent, Ident, Eof]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let source = "a:\n    b\n\n  # note\n\t\n      \n    c\nd";
        assert_eq!(
            kinds(source),
            vec![Ident, Colon, Indent, Ident, Ident, Dedent, Ident, Eof]
        );
    }

    #[test]
    fn test_blank_line_whitespace_does_not_fix_style() {
        let mut lexer = lexer("a\n\t\n  b\n", IndentConfig::default());
        lexer.tokenize().unwrap();
        assert_eq!(lexer.style(), Some(IndentStyle::Spaces));
    }

    #[test]
    fn test_brackets_suspend_indentation() {
        use TokenKind::{Comma, Int, LParen, RParen};
        assert_eq!(
            kinds("f(1,\n        2,\n  3)\ng\n"),
            vec![Ident, LParen, Int, Comma, Int, Comma, Int, RParen, Ident, Eof]
        );
    }

    #[test]
    fn test_accessors_follow_the_stream() {
        let mut lexer = lexer("a:\n  f(1,\n    g(\n", IndentConfig::default());
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(lexer.next_token().unwrap().kind);
        }
        assert_eq!(seen[..4], [Ident, Colon, Indent, Ident]);
        assert_eq!(lexer.depth(), 1);
        assert_eq!(lexer.bracket_depth(), 1);
        assert_eq!(lexer.style(), Some(IndentStyle::Spaces));

        while lexer.next_token().unwrap().text != "(" {}
        assert_eq!(lexer.bracket_depth(), 2);
        assert_eq!(lexer.next_token().unwrap().kind, Dedent);
        assert_eq!(lexer.depth(), 0);
    }

    #[test]
    fn test_synthetic_tokens_have_no_text() {
        let tokens = lexer("a:\n  b:\n    c\nd\n", IndentConfig::default())
            .tokenize()
            .unwrap();
        for token in &tokens {
            assert_eq!(token.kind.is_synthetic(), token.text.is_empty(), "{:?}", token);
        }
        assert_eq!(tokens.iter().filter(|t| t.kind.is_synthetic()).count(), 5);
    }

    #[test]
    fn test_unbalanced_closer_is_not_validated() {
        use TokenKind::RParen;
        assert_eq!(kinds("a)\n  b\n"), vec![Ident, RParen, Indent, Ident, Dedent, Eof]);
    }

    #[test]
    fn test_eof_closes_all_blocks() {
        let mut lexer = lexer("a:\n  b:\n    c", IndentConfig::default());
        let tokens: Vec<_> = lexer.tokenize().unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            tokens,
            vec![Ident, Colon, Indent, Ident, Colon, Indent, Ident, Dedent, Dedent, Eof]
        );
        assert_eq!(lexer.indent_levels(), &[0]);
        assert!(lexer.is_finished());
    }

    #[test]
    fn test_eof_after_trailing_blank_lines() {
        assert_eq!(kinds("a:\n  b\n\n   \n# end\n"), vec![Ident, Colon, Indent, Ident, Dedent, Eof]);
    }

    #[test]
    fn test_empty_and_blank_only_units() {
        assert_eq!(kinds(""), vec![Eof]);
        assert_eq!(kinds("\n\n  # only a comment\n\t\n"), vec![Eof]);
    }

    #[test]
    fn test_indented_first_line_opens_a_block() {
        assert_eq!(kinds("\n  a\nb\n"), vec![Indent, Ident, Dedent, Ident, Eof]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(kinds("a:\r\n    b\r\nc\r\n"), vec![Ident, Colon, Indent, Ident, Dedent, Ident, Eof]);
    }

    #[test]
    fn test_synthetic_tokens_sit_at_the_content_token() {
        let tokens = lexer("a:\n    b\n", IndentConfig::default()).tokenize().unwrap();
        let indent = &tokens[2];
        assert_eq!(indent.kind, Indent);
        assert!(indent.text.is_empty());
        assert_eq!((indent.line(), indent.column()), (2, 5));
        assert_eq!(tokens[3].span.start, indent.span.start);

        let dedent = &tokens[4];
        assert_eq!(dedent.kind, Dedent);
        assert_eq!(dedent.span.start, tokens[5].span.start);
    }

    #[test]
    fn test_tab_width() {
        let config = IndentConfig::new().with_tab_width(8);
        let mut lexer = lexer("a:\n\tb:\n\t\tc\n", config);
        while lexer.next_token().unwrap().text != "c" {}
        assert_eq!(lexer.indent_levels(), &[0, 8, 16]);
        assert_eq!(lexer.style(), Some(IndentStyle::Tabs));
    }

    #[test]
    fn test_huge_tab_width_saturates() {
        let config = IndentConfig::new().with_tab_width(u32::MAX / 2 + 1);
        let mut lexer = lexer("a:\n\tb:\n\t\tc\n", config);
        let kinds: Vec<_> = lexer.tokenize().unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Ident, Colon, Indent, Ident, Colon, Indent, Ident, Dedent, Dedent, Eof]
        );
        assert_eq!(lexer.indent_levels(), &[0]);
    }

    #[test]
    fn test_mixed_chars_on_one_line() {
        for source in ["a:\n\t b\n", "a:\n \tb\n"] {
            match kinds_with(source, IndentConfig::default()) {
                Err(LexError::MixedIndentChars { span }) => {
                    assert_eq!((span.start.line, span.start.column), (2, 1));
                }
                other => panic!("expected mixed indentation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_mixed_chars_are_fatal_even_when_lenient() {
        let config = IndentConfig::new().with_style_policy(StylePolicy::Lenient);
        assert!(matches!(
            kinds_with("a:\n\t b\n", config),
            Err(LexError::MixedIndentChars { .. })
        ));
    }

    #[test]
    fn test_inconsistent_style() {
        let source = "a:\n    b\n\tc\n";
        assert_eq!(
            kinds_with(source, IndentConfig::default()),
            Err(LexError::InconsistentIndentStyle {
                span: Span::new(Position::new(3, 1, 9), Position::new(3, 2, 10), 0),
                expected: IndentStyle::Spaces,
                found: IndentStyle::Tabs,
                established: Span::new(Position::new(2, 1, 3), Position::new(2, 5, 7), 0),
            })
        );

        let lenient = IndentConfig::new().with_style_policy(StylePolicy::Lenient);
        assert_eq!(
            kinds_with(source, lenient).unwrap(),
            vec![Ident, Colon, Indent, Ident, Ident, Dedent, Eof]
        );
    }

    #[test]
    fn test_unmatched_dedent() {
        let result = kinds_with("a\n  b\n     c\n   d\n", IndentConfig::default());
        match result {
            Err(LexError::UnmatchedDedent { span, width, levels }) => {
                assert_eq!(span.start.line, 4);
                assert_eq!(width, 3);
                assert_eq!(levels, vec![0, 2, 5]);
            }
            other => panic!("expected unmatched dedent, got {:?}", other),
        }
    }

    #[test]
    fn test_error_is_sticky() {
        let mut lexer = lexer("a\n  b\n c\nd\n", IndentConfig::default());
        let first = loop {
            match lexer.next_token() {
                Ok(_) => continue,
                Err(err) => break err,
            }
        };
        assert_eq!(first.line(), 3);
        assert_eq!(lexer.next_token(), Err(first));
    }

    #[test]
    fn test_eof_is_fused() {
        let mut lexer = lexer("a:\n  b", IndentConfig::default());
        let tokens = lexer.tokenize().unwrap();
        let eof = tokens.last().unwrap().clone();
        assert_eq!(lexer.next_token(), Ok(eof.clone()));
        assert_eq!(lexer.next_token(), Ok(eof));
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let lexer = lexer("a:\n  b\n", IndentConfig::default());
        let kinds: Vec<_> = lexer.map(|r| r.unwrap().kind).collect();
        assert_eq!(kinds, vec![Ident, Colon, Indent, Ident, Dedent, Eof]);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let items: Vec<_> = lexer("a:\n\t b\nc\n", IndentConfig::default()).collect();
        assert_eq!(items.len(), 3);
        assert!(items[2].is_err());
    }

    #[test]
    fn test_emit_newlines() {
        use TokenKind::Newline;
        let config = IndentConfig::new().with_newlines(true);
        assert_eq!(
            kinds_with("a\n  b\n\n  c\nd", config).unwrap(),
            vec![Ident, Newline, Indent, Ident, Newline, Ident, Newline, Dedent, Ident, Newline, Eof]
        );
    }

    #[test]
    fn test_emitted_newline_is_the_raw_one() {
        let config = IndentConfig::new().with_newlines(true);
        let tokens = lexer("a\nb\n", config).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].text, "\n");
        assert_eq!(tokens[1].span.start, Position::new(1, 2, 1));
    }

    #[test]
    fn test_stacked_over_token_buffer() {
        use crate::source::TokenBuffer;
        let raw = RawLexer::new("a:\n  b\n", 0).tokenize();
        let mut lexer = IndentLexer::new(TokenBuffer::new(raw));
        let kinds: Vec<_> = lexer.tokenize().unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Ident, Colon, Indent, Ident, Dedent, Eof]);
    }
}
