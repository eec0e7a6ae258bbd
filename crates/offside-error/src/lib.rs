//! offside-error - positions, spans and diagnostics
//!
//! Shared by the raw lexer, the indentation transducer and the CLI to report
//! problems with the exact line and column they were found at.
//!
//! # Example
//!
//! ```rust
//! use offside_error::{Diagnostic, DiagnosticRenderer, ErrorCode, SourceCache};
//! use offside_error::span::{Position, Span};
//!
//! let mut cache = SourceCache::new();
//! let file_id = cache.add("example.off", "if x:\n\t y\n");
//!
//! let span = Span::point(Position::new(2, 3, 8), file_id);
//! let diagnostic = Diagnostic::error("mixed tabs and spaces in indentation")
//!     .with_code(ErrorCode::MIXED_INDENT_CHARS)
//!     .with_label(span, "indentation starts with a tab and continues with spaces");
//!
//! let renderer = DiagnosticRenderer::new(&cache).without_colors();
//! assert!(renderer.render(&diagnostic).contains("error[EI001]"));
//! ```

pub mod diagnostic;
pub mod span;

pub use diagnostic::{
    Diagnostic, DiagnosticRenderer, ErrorCode, Label, Level, SourceCache, SourceFile,
};
pub use span::{Position, Span, Spanned};

/// Diagnostics accumulated while processing a source unit
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.level == Level::Error).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Renders every diagnostic, separated by blank lines
    pub fn render(&self, renderer: &DiagnosticRenderer<'_>) -> String {
        self.items
            .iter()
            .map(|d| renderer.render(d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            items: vec![diagnostic],
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
