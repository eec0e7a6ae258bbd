//! Source locations
//!
//! Every token and every diagnostic label points back into the source unit
//! through a [`Span`].

use serde::Serialize;

/// A single point in a source unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// Line (1-indexed)
    pub line: u32,
    /// Column (1-indexed, counted in chars)
    pub column: u32,
    /// Byte offset from the beginning of the unit
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// The first position of any source unit
    pub fn origin() -> Self {
        Self::new(1, 1, 0)
    }
}

/// A half-open region `[start, end)` of a source unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
    /// Source unit ID, as handed out by `SourceCache::add`
    pub file_id: u32,
}

impl Span {
    pub fn new(start: Position, end: Position, file_id: u32) -> Self {
        Self { start, end, file_id }
    }

    /// Zero-width span at `pos`
    pub fn point(pos: Position, file_id: u32) -> Self {
        Self {
            start: pos,
            end: pos,
            file_id,
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line of the first byte
    pub fn line(&self) -> u32 {
        self.start.line
    }

    /// Column of the first byte
    pub fn column(&self) -> u32 {
        self.start.column
    }
}

/// Anything that can point at its own source region
pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}
