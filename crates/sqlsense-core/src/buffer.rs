//! Read-only access to the editor's text buffer.

use crate::types::{Position, Range};

/// Synchronous, read-only view of an editor buffer.
///
/// Lines and columns are 1-based; columns count characters. Implementations
/// clamp out-of-range positions: a line past the end maps to the last line and
/// a column past the end of a line maps to the line end.
pub trait TextBuffer {
    fn line_count(&self) -> usize;

    /// Text of `line` without its line terminator; empty when out of range.
    fn line_text(&self, line: usize) -> &str;

    /// Text between two positions. Empty when `range.end` precedes `range.start`.
    fn text_in_range(&self, range: Range) -> String;

    /// Position of a byte offset into the full text.
    fn position_at(&self, offset: usize) -> Position;

    /// Whole buffer, lines joined with `\n`.
    fn full_text(&self) -> String {
        (1..=self.line_count())
            .map(|line| self.line_text(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Immutable snapshot of buffer contents with a precomputed line index.
#[derive(Debug, Clone)]
pub struct BufferSnapshot {
    text: String,
    line_starts: Vec<usize>,
}

impl BufferSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            text.char_indices()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of a position, after clamping it into the buffer.
    pub fn offset_at(&self, position: Position) -> usize {
        let line = position.line.clamp(1, self.line_count());
        let line_start = self.line_starts[line - 1];
        let line_text = self.line_text(line);

        let column = position.column.max(1);
        line_text
            .char_indices()
            .nth(column - 1)
            .map(|(idx, _)| line_start + idx)
            .unwrap_or(line_start + line_text.len())
    }
}

impl TextBuffer for BufferSnapshot {
    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_text(&self, line: usize) -> &str {
        if line == 0 || line > self.line_count() {
            return "";
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches('\r')
    }

    fn text_in_range(&self, range: Range) -> String {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);
        if end <= start {
            return String::new();
        }
        self.text[start..end].to_string()
    }

    fn position_at(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line_index = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let line_start = self.line_starts[line_index];
        let column = self.text[line_start..offset].chars().count() + 1;
        Position::new(line_index + 1, column)
    }

    fn full_text(&self) -> String {
        self.text.clone()
    }
}
