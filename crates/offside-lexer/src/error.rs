//! Fatal indentation errors

use crate::config::IndentStyle;
use offside_error::{Diagnostic, ErrorCode, Span, Spanned};
use thiserror::Error;

/// Aborts tokenization of the current source unit.
///
/// The span runs from the start of the offending line to its first content
/// token, so `span.start` is the line and column to report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("mixed tabs and spaces in indentation at line {}", .span.start.line)]
    MixedIndentChars { span: Span },

    #[error(
        "inconsistent indentation at line {}: this unit indents with {expected}, this line with {found}",
        .span.start.line
    )]
    InconsistentIndentStyle {
        span: Span,
        expected: IndentStyle,
        found: IndentStyle,
        /// Line that first indented with `expected`
        established: Span,
    },

    #[error(
        "dedent does not match any enclosing indentation level at line {}: width {width}",
        .span.start.line
    )]
    UnmatchedDedent {
        span: Span,
        width: u32,
        /// Indent stack at the time of the error, outermost first
        levels: Vec<u32>,
    },
}

impl LexError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LexError::MixedIndentChars { .. } => ErrorCode::MIXED_INDENT_CHARS,
            LexError::InconsistentIndentStyle { .. } => ErrorCode::INCONSISTENT_INDENT_STYLE,
            LexError::UnmatchedDedent { .. } => ErrorCode::UNMATCHED_DEDENT,
        }
    }

    pub fn line(&self) -> u32 {
        self.span().start.line
    }

    pub fn column(&self) -> u32 {
        self.span().start.column
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let span = self.span();
        match self {
            LexError::MixedIndentChars { .. } => {
                Diagnostic::error("mixed tabs and spaces in indentation")
                    .with_code(self.code())
                    .with_label(span, "this indentation uses both tabs and spaces")
                    .with_help("indent each line with only tabs or only spaces")
            }
            LexError::InconsistentIndentStyle {
                expected,
                found,
                established,
                ..
            } => Diagnostic::error("inconsistent use of tabs and spaces in indentation")
                .with_code(self.code())
                .with_label(span, format!("indented with {}", found))
                .with_secondary_label(*established, format!("first indented with {} here", expected))
                .with_note(format!("earlier lines of this unit are indented with {}", expected))
                .with_help(format!("indent this line with {}", expected)),
            LexError::UnmatchedDedent { width, levels, .. } => {
                let open = levels
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                Diagnostic::error("dedent does not match any enclosing indentation level")
                    .with_code(self.code())
                    .with_label(span, format!("width {}, open levels are {}", width, open))
                    .with_help("dedent to one of the open levels")
            }
        }
    }
}

impl Spanned for LexError {
    fn span(&self) -> Span {
        match self {
            LexError::MixedIndentChars { span }
            | LexError::InconsistentIndentStyle { span, .. }
            | LexError::UnmatchedDedent { span, .. } => *span,
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        err.to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offside_error::Position;

    fn span_at(line: u32) -> Span {
        Span::new(Position::new(line, 1, 0), Position::new(line, 4, 3), 0)
    }

    #[test]
    fn test_messages_carry_line() {
        let err = LexError::MixedIndentChars { span: span_at(7) };
        assert_eq!(err.to_string(), "mixed tabs and spaces in indentation at line 7");
        assert_eq!((err.line(), err.column()), (7, 1));

        let err = LexError::InconsistentIndentStyle {
            span: span_at(10),
            expected: IndentStyle::Spaces,
            found: IndentStyle::Tabs,
            established: span_at(2),
        };
        assert_eq!(
            err.to_string(),
            "inconsistent indentation at line 10: this unit indents with spaces, this line with tabs"
        );
    }

    #[test]
    fn test_inconsistent_style_points_at_first_indented_line() {
        let err = LexError::InconsistentIndentStyle {
            span: span_at(10),
            expected: IndentStyle::Tabs,
            found: IndentStyle::Spaces,
            established: span_at(2),
        };
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.labels.len(), 2);
        assert!(diagnostic.labels[0].primary);
        assert!(!diagnostic.labels[1].primary);
        assert_eq!(diagnostic.labels[1].span, span_at(2));
        assert_eq!(diagnostic.labels[1].message, "first indented with tabs here");
    }

    #[test]
    fn test_unmatched_dedent_diagnostic() {
        let err = LexError::UnmatchedDedent {
            span: span_at(4),
            width: 3,
            levels: vec![0, 2, 5],
        };
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code, Some(ErrorCode::UNMATCHED_DEDENT));
        assert_eq!(diagnostic.labels[0].message, "width 3, open levels are 0, 2, 5");
        assert_eq!(diagnostic.primary_span(), Some(span_at(4)));
    }
}
