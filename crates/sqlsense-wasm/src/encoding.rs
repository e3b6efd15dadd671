//! Column encoding conversion for the WASM API.
//!
//! The core counts columns in characters. JavaScript editors such as Monaco
//! count UTF-16 code units, so a column after an emoji differs by one. Requests
//! may opt into UTF-16 columns; positions are converted on the way in and
//! ranges on the way out. Lines are unaffected.

use serde::{Deserialize, Serialize};
use sqlsense_core::{Position, Range, TextBuffer};

/// Unit that `column` values in a request and its response are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Unicode scalar values (default).
    #[default]
    Chars,
    /// UTF-16 code units (for Monaco/JavaScript consumers).
    Utf16,
}

/// Converts a 1-based UTF-16 column on `line` to a 1-based character column.
///
/// A column that falls inside a surrogate pair maps to the character it
/// splits; columns past the end clamp to just after the last character.
pub fn utf16_to_char_column(line: &str, utf16_column: usize) -> usize {
    let target = utf16_column.saturating_sub(1);
    let mut utf16_count = 0;

    for (index, ch) in line.chars().enumerate() {
        if utf16_count >= target {
            return index + 1;
        }
        utf16_count += ch.len_utf16();
        if utf16_count > target {
            return index + 1;
        }
    }

    line.chars().count() + 1
}

/// Converts a 1-based character column on `line` to a 1-based UTF-16 column.
pub fn char_to_utf16_column(line: &str, char_column: usize) -> usize {
    line.chars()
        .take(char_column.saturating_sub(1))
        .map(char::len_utf16)
        .sum::<usize>()
        + 1
}

/// Position as the core expects it.
pub fn position_to_core<B: TextBuffer + ?Sized>(
    buffer: &B,
    position: Position,
    encoding: Encoding,
) -> Position {
    match encoding {
        Encoding::Chars => position,
        Encoding::Utf16 => Position::new(
            position.line,
            utf16_to_char_column(buffer.line_text(position.line), position.column),
        ),
    }
}

/// Range in the encoding the caller asked for.
pub fn range_from_core<B: TextBuffer + ?Sized>(buffer: &B, range: Range, encoding: Encoding) -> Range {
    match encoding {
        Encoding::Chars => range,
        Encoding::Utf16 => {
            let convert = |position: Position| {
                Position::new(
                    position.line,
                    char_to_utf16_column(buffer.line_text(position.line), position.column),
                )
            };
            Range::new(convert(range.start), convert(range.end))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsense_core::BufferSnapshot;

    #[test]
    fn test_ascii_columns_are_identical() {
        let line = "SELECT * FROM users";
        for column in 1..=20 {
            assert_eq!(utf16_to_char_column(line, column), column);
            assert_eq!(char_to_utf16_column(line, column), column);
        }
    }

    #[test]
    fn test_bmp_multibyte_is_one_unit() {
        // 'é' is 2 bytes in UTF-8 but 1 UTF-16 unit and 1 character.
        let line = "SELECT 'é', x";
        assert_eq!(utf16_to_char_column(line, 10), 10);
        assert_eq!(char_to_utf16_column(line, 10), 10);
    }

    #[test]
    fn test_emoji_takes_two_units() {
        // '🎉' is 2 UTF-16 code units and 1 character.
        let line = "'🎉' u.";
        // After the closing quote: char column 4, UTF-16 column 5.
        assert_eq!(char_to_utf16_column(line, 4), 5);
        assert_eq!(utf16_to_char_column(line, 5), 4);
        // End of line.
        assert_eq!(char_to_utf16_column(line, 7), 8);
        assert_eq!(utf16_to_char_column(line, 8), 7);
    }

    #[test]
    fn test_column_inside_surrogate_pair() {
        let line = "🎉x";
        assert_eq!(utf16_to_char_column(line, 2), 1);
        assert_eq!(utf16_to_char_column(line, 3), 2);
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(utf16_to_char_column("ab", 99), 3);
        assert_eq!(utf16_to_char_column("", 5), 1);
    }

    #[test]
    fn test_buffer_conversion_round_trip() {
        let buffer = BufferSnapshot::new("SELECT 1;\nSELECT '🎉', u.");
        let utf16 = Position::new(2, 16);
        let core = position_to_core(&buffer, utf16, Encoding::Utf16);
        assert_eq!(core, Position::new(2, 15));

        let range = range_from_core(&buffer, Range::new(core, core), Encoding::Utf16);
        assert_eq!(range.start, utf16);
        assert_eq!(position_to_core(&buffer, utf16, Encoding::Chars), utf16);
    }
}
