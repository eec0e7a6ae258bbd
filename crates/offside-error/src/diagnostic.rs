//! Diagnostics rendered in the style of `rustc`
//!
//! ```text
//! error[EI003]: dedent does not match any enclosing indentation level
//!  --> demo.off:4:4
//!   |
//! 4 |    y
//!   |    ^ width 3, open levels are 0, 2, 5
//!   = help: dedent to one of the open levels
//! ```

use crate::span::Span;
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Aborts processing of the source unit
    Error,
    Warning,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
        }
    }

    /// ANSI escape used for the level header
    pub fn color_code(&self) -> &'static str {
        match self {
            Level::Error => "\x1b[1;31m",
            Level::Warning => "\x1b[1;33m",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message attached to a region of source
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
    /// Primary labels are underlined with `^`, secondary ones with `-`
    pub primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: false,
        }
    }
}

/// Structured error code, printed as `E<category><number>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// L = raw lexing, I = indentation
    pub category: char,
    pub number: u16,
}

impl ErrorCode {
    pub const fn new(category: char, number: u16) -> Self {
        Self { category, number }
    }

    // Raw lexing
    pub const UNEXPECTED_CHAR: Self = Self::new('L', 1);

    // Indentation
    pub const MIXED_INDENT_CHARS: Self = Self::new('I', 1);
    pub const INCONSISTENT_INDENT_STYLE: Self = Self::new('I', 2);
    pub const UNMATCHED_DEDENT: Self = Self::new('I', 3);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}{:03}", self.category, self.number)
    }
}

/// A complete diagnostic
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_level(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(Level::Warning, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Adds a primary label
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Span of the first primary label, if any
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.primary).map(|l| l.span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level)?;
        if let Some(code) = &self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(span) = self.primary_span() {
            write!(f, " at {}:{}", span.start.line, span.start.column)?;
        }
        Ok(())
    }
}

/// Source units known to the renderer
#[derive(Debug, Default)]
pub struct SourceCache {
    files: Vec<SourceFile>,
}

#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// Byte offset at which each line begins
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Text of a 1-indexed line, without its terminator
    pub fn get_line(&self, line: u32) -> Option<&str> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&next| next.saturating_sub(1))
            .unwrap_or(self.source.len());

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source unit and returns its ID
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> u32 {
        let id = self.files.len() as u32;
        self.files.push(SourceFile::new(name, source));
        id
    }

    pub fn get(&self, id: u32) -> Option<&SourceFile> {
        self.files.get(id as usize)
    }
}

struct Palette {
    reset: &'static str,
    bold: &'static str,
    blue: &'static str,
    green: &'static str,
}

impl Palette {
    fn new(colored: bool) -> Self {
        if colored {
            Self {
                reset: "\x1b[0m",
                bold: "\x1b[1m",
                blue: "\x1b[1;34m",
                green: "\x1b[1;32m",
            }
        } else {
            Self {
                reset: "",
                bold: "",
                blue: "",
                green: "",
            }
        }
    }
}

/// Renders diagnostics against a [`SourceCache`]
pub struct DiagnosticRenderer<'a> {
    cache: &'a SourceCache,
    use_colors: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(cache: &'a SourceCache) -> Self {
        Self {
            cache,
            use_colors: true,
        }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let p = Palette::new(self.use_colors);
        let level_color = if self.use_colors {
            diagnostic.level.color_code()
        } else {
            ""
        };
        let mut out = String::new();

        out.push_str(level_color);
        out.push_str(diagnostic.level.as_str());
        if let Some(code) = &diagnostic.code {
            out.push_str(&format!("[{}]", code));
        }
        out.push_str(&format!(
            "{}{}: {}{}\n",
            p.reset, p.bold, diagnostic.message, p.reset
        ));

        for label in &diagnostic.labels {
            let Some(file) = self.cache.get(label.span.file_id) else {
                continue;
            };
            let line = label.span.start.line;
            out.push_str(&format!(
                " {}-->{} {}:{}:{}\n",
                p.blue, p.reset, file.name, line, label.span.start.column
            ));

            let Some(text) = file.get_line(line) else {
                continue;
            };
            let gutter = " ".repeat(line.to_string().len());
            let column = label.span.start.column as usize;
            let width = if label.span.end.line == line {
                (label.span.end.column as usize).saturating_sub(column).max(1)
            } else {
                text.chars().count().saturating_sub(column - 1).max(1)
            };
            let marker = if label.primary { '^' } else { '-' };
            let marker_color = if label.primary { level_color } else { p.blue };

            out.push_str(&format!(" {} {}|{}\n", gutter, p.blue, p.reset));
            out.push_str(&format!(" {}{}{} | {}\n", p.blue, line, p.reset, text));
            out.push_str(&format!(
                " {} {}|{} {}{}{}{} {}\n",
                gutter,
                p.blue,
                p.reset,
                underline_padding(text, column),
                marker_color,
                marker.to_string().repeat(width),
                p.reset,
                label.message
            ));
        }

        for note in &diagnostic.notes {
            out.push_str(&format!("  = {}note{}: {}\n", p.bold, p.reset, note));
        }
        for help in &diagnostic.help {
            out.push_str(&format!("  = {}help{}: {}\n", p.green, p.reset, help));
        }

        out
    }
}

/// Whitespace that lines a marker up under `column` of `text`; tabs are kept
fn underline_padding(text: &str, column: usize) -> String {
    text.chars()
        .take(column.saturating_sub(1))
        .map(|ch| if ch == '\t' { '\t' } else { ' ' })
        .chain(std::iter::repeat(' '))
        .take(column.saturating_sub(1))
        .collect()
}
