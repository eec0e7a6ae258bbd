//! End-to-end tests for the offside tokenizer
//!
//! Source text goes through the full pipeline, `RawLexer` → `IndentLexer`,
//! and the resulting stream is compared in a compact layout notation: the
//! text of each token, with `INDENT`, `DEDENT`, `NEWLINE` and `EOF` standing
//! in for the tokens that have none.

use offside_lexer::{IndentConfig, IndentLexer, LexError, RawLexer, Token, TokenKind};

/// Lexes a source unit with the default configuration
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    lex_with(source, &IndentConfig::default())
}

pub fn lex_with(source: &str, config: &IndentConfig) -> Result<Vec<Token>, LexError> {
    IndentLexer::with_config(RawLexer::new(source, 0), config.clone()).tokenize()
}

/// Renders a token stream in layout notation
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| match token.kind {
            TokenKind::Indent => "INDENT".to_string(),
            TokenKind::Dedent => "DEDENT".to_string(),
            TokenKind::Newline => "NEWLINE".to_string(),
            TokenKind::Eof => "EOF".to_string(),
            _ => token.text.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Layout notation of a source unit lexed with `config`
pub fn layout_with(source: &str, config: &IndentConfig) -> String {
    match lex_with(source, config) {
        Ok(tokens) => render(&tokens),
        Err(err) => panic!("Expected source to lex, but got: {}\n\nSource:\n{}", err, source),
    }
}

pub fn layout(source: &str) -> String {
    layout_with(source, &IndentConfig::default())
}

/// Asserts that source lexes to the expected layout
pub fn assert_layout(source: &str, expected: &str) {
    let actual = layout(source);
    if actual != expected {
        panic!(
            "Layout mismatch.\n\nSource:\n{}\nExpected: {}\nActual:   {}",
            source, expected, actual
        );
    }
}

/// Asserts that source fails to lex, returning the error
pub fn assert_lex_fails(source: &str) -> LexError {
    lex_fails_with(source, &IndentConfig::default())
}

pub fn lex_fails_with(source: &str, config: &IndentConfig) -> LexError {
    match lex_with(source, config) {
        Ok(tokens) => panic!(
            "Expected source to fail lexing, but it produced: {}",
            render(&tokens)
        ),
        Err(err) => err,
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Builds a program from `(level, filler)` pairs, each line at most one
    /// level deeper than the previous one, and the layout it should lex to.
    ///
    /// `filler` puts a blank or comment-only line before the content line.
    fn program(lines: &[(usize, u8)], unit: usize) -> (String, String) {
        let mut source = String::new();
        let mut expected = Vec::new();
        let mut depth = 0;

        for (i, &(requested, filler)) in lines.iter().enumerate() {
            match filler {
                1 => source.push_str(" \t \n"),
                2 => source.push_str(&format!("{}# note {}\n", " ".repeat(i % 7), i)),
                _ => {}
            }

            let level = requested.min(depth + 1);
            if level > depth {
                expected.push("INDENT".to_string());
            }
            while depth > level {
                expected.push("DEDENT".to_string());
                depth -= 1;
            }
            depth = level;

            source.push_str(&" ".repeat(level * unit));
            source.push_str(&format!("x{}\n", i));
            expected.push(format!("x{}", i));
        }

        expected.extend(std::iter::repeat("DEDENT".to_string()).take(depth));
        expected.push("EOF".to_string());
        (source, expected.join(" "))
    }

    fn lines() -> impl Strategy<Value = Vec<(usize, u8)>> {
        prop::collection::vec((0usize..6, 0u8..4), 0..40)
    }

    proptest! {
        #[test]
        fn prop_layout_matches_model(lines in lines(), unit in 1usize..5) {
            let (source, expected) = program(&lines, unit);
            prop_assert_eq!(layout(&source), expected);
        }

        #[test]
        fn prop_indents_balance_dedents(lines in lines(), unit in 1usize..5) {
            let (source, _) = program(&lines, unit);
            let mut lexer = IndentLexer::new(RawLexer::new(&source, 0));
            let tokens = lexer.tokenize().unwrap();

            let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
            let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
            prop_assert_eq!(indents, dedents);
            prop_assert_eq!(lexer.indent_levels(), &[0]);
        }

        #[test]
        fn prop_tabs_and_spaces_agree(lines in lines()) {
            let (spaced, _) = program(&lines, 4);
            let tabbed = spaced.replace("    ", "\t");
            prop_assert_eq!(layout(&spaced), layout(&tabbed));
        }

        #[test]
        fn prop_content_passes_through(lines in lines(), unit in 1usize..5) {
            let (source, _) = program(&lines, unit);
            let transduced: Vec<_> = lex(&source)
                .unwrap()
                .into_iter()
                .filter(|t| !matches!(t.kind, TokenKind::Indent | TokenKind::Dedent))
                .collect();
            let raw: Vec<_> = offside_lexer::tokenize_raw(&source, 0)
                .0
                .into_iter()
                .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Newline)
                .collect();
            prop_assert_eq!(transduced, raw);
        }
    }
}
