//! Statement segmentation over a multi-statement buffer.
//!
//! Both scans run over masked text, so parentheses and semicolons inside
//! comments, string literals and quoted identifiers never count.

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::mask::mask_sql;
use crate::types::StatementSpan;

/// Leading words that open a new top-level statement at depth zero.
const STATEMENT_VERBS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP",
];

/// Masked copy of the buffer, one entry per buffer line.
struct MaskedLines {
    lines: Vec<String>,
}

impl MaskedLines {
    fn new<B: TextBuffer + ?Sized>(buffer: &B) -> Self {
        let masked = mask_sql(&buffer.full_text());
        let lines = masked
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        Self { lines }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// Text of a 1-based line.
    fn line(&self, line: usize) -> &str {
        self.lines.get(line - 1).map(String::as_str).unwrap_or("")
    }

    fn starts(&self) -> Vec<usize> {
        let mut starts = Vec::new();
        let mut depth = 0usize;
        let mut in_cte = false;

        for (idx, line) in self.lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if depth == 0 {
                let word = leading_word(trimmed);
                if word.eq_ignore_ascii_case("WITH") {
                    starts.push(idx + 1);
                    in_cte = true;
                } else if !in_cte && STATEMENT_VERBS.iter().any(|v| word.eq_ignore_ascii_case(v)) {
                    starts.push(idx + 1);
                }
            }

            depth = track_depth(depth, trimmed);
            if trimmed.ends_with(';') {
                depth = 0;
                in_cte = false;
            }
        }

        starts
    }

    fn span(&self, target: usize) -> StatementSpan {
        let target = target.clamp(1, self.len());
        let start = self.span_start(target);
        let end = self.span_end(start).max(target);
        StatementSpan::new(start, end)
    }

    /// Nearest statement start at or above `target`, bounded by the first
    /// terminator line above it.
    fn span_start(&self, target: usize) -> usize {
        let nearest_start = self
            .starts()
            .into_iter()
            .rev()
            .find(|start| *start <= target);

        let terminator = self
            .terminators()
            .into_iter()
            .rev()
            .find(|line| *line < target);
        let after_terminator = match terminator {
            Some(line) => self.first_content_line(line + 1, target),
            None => self.first_content_line(1, target),
        };

        match nearest_start {
            Some(start) => start.max(after_terminator),
            None => after_terminator,
        }
    }

    /// First line from `start` through `target` holding anything besides
    /// whitespace; `target` when every line in between is blank.
    fn first_content_line(&self, start: usize, target: usize) -> usize {
        (start..=target)
            .find(|line| !self.line(*line).trim().is_empty())
            .unwrap_or(target)
    }

    /// First terminator line at or after `start`, or the last line of the buffer.
    fn span_end(&self, start: usize) -> usize {
        self.terminators()
            .into_iter()
            .find(|line| *line >= start)
            .unwrap_or(self.len())
    }

    /// Lines holding a `;` at parenthesis depth zero, scanned from the top.
    ///
    /// Depth resets after a line ending in `;`, as in [`Self::starts`], so an
    /// unclosed parenthesis cannot swallow every later statement.
    fn terminators(&self) -> Vec<usize> {
        let mut terminators = Vec::new();
        let mut depth = 0usize;

        for (idx, line) in self.lines.iter().enumerate() {
            let mut terminated = false;
            for ch in line.chars() {
                match ch {
                    '(' => depth += 1,
                    ')' => depth = depth.saturating_sub(1),
                    ';' if depth == 0 => terminated = true,
                    _ => {}
                }
            }
            if terminated {
                terminators.push(idx + 1);
            }
            if line.trim_end().ends_with(';') {
                depth = 0;
            }
        }

        terminators
    }
}

fn leading_word(line: &str) -> &str {
    let end = line
        .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .unwrap_or(line.len());
    &line[..end]
}

/// Applies the parentheses of one line to `depth`, never going below zero.
fn track_depth(depth: usize, line: &str) -> usize {
    line.chars().fold(depth, |depth, ch| match ch {
        '(' => depth + 1,
        ')' => depth.saturating_sub(1),
        _ => depth,
    })
}

/// Ordered 1-based line numbers where a top-level statement begins.
pub fn statement_starts<B: TextBuffer + ?Sized>(buffer: &B) -> Vec<usize> {
    MaskedLines::new(buffer).starts()
}

/// Line span of the statement containing `line`.
///
/// `line` is clamped into the buffer. When no terminator follows, the span
/// runs to the last line.
pub fn statement_span<B: TextBuffer + ?Sized>(buffer: &B, line: usize) -> StatementSpan {
    let span = MaskedLines::new(buffer).span(line);

    #[cfg(feature = "tracing")]
    debug!(
        line,
        start = span.start_line,
        end = span.end_line,
        "resolved statement span"
    );

    span
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferSnapshot;

    fn starts(text: &str) -> Vec<usize> {
        statement_starts(&BufferSnapshot::new(text))
    }

    fn span(text: &str, line: usize) -> (usize, usize) {
        let span = statement_span(&BufferSnapshot::new(text), line);
        (span.start_line, span.end_line)
    }

    #[test]
    fn test_leading_word() {
        assert_eq!(leading_word("SELECT *"), "SELECT");
        assert_eq!(leading_word("with(x)"), "with");
        assert_eq!(leading_word("(SELECT"), "");
    }

    #[test]
    fn test_depth_clamps_at_zero() {
        assert_eq!(track_depth(0, "))) ("), 1);
        assert_eq!(track_depth(2, "a) b)"), 0);
    }

    #[test]
    fn test_starts_skip_blank_and_comment_lines() {
        let text = "SELECT 1;\n\n-- DELETE FROM x;\nUPDATE roles\nSET a = 1;";
        assert_eq!(starts(text), vec![1, 4]);
    }

    #[test]
    fn test_nested_select_is_not_a_start() {
        let text = "SELECT *\nFROM (\nSELECT id FROM users\n) u;";
        assert_eq!(starts(text), vec![1]);
    }

    #[test]
    fn test_cte_body_and_main_select_are_one_statement() {
        let text = "WITH cte AS (\nSELECT * FROM users\n)\nSELECT * FROM cte;\nDELETE FROM t;";
        assert_eq!(starts(text), vec![1, 5]);
        assert_eq!(span(text, 4), (1, 4));
        assert_eq!(span(text, 5), (5, 5));
    }

    #[test]
    fn test_span_stops_at_terminator_above() {
        let text = "SELECT 1;\nUPDATE roles SET ";
        assert_eq!(span(text, 2), (2, 2));
        assert_eq!(span(text, 1), (1, 1));
    }

    #[test]
    fn test_span_ignores_semicolons_in_strings_and_comments() {
        let text = "SELECT ';'\n-- ;\nFROM users /* ; */\nWHERE 1 = 1;";
        assert_eq!(span(text, 3), (1, 4));
    }

    #[test]
    fn test_span_without_terminator_runs_to_end() {
        let text = "\n\nSELECT *\nFROM users\nWHERE ";
        assert_eq!(span(text, 5), (3, 5));
    }

    #[test]
    fn test_out_of_range_line_is_clamped() {
        let text = "SELECT 1;\nSELECT 2;";
        assert_eq!(span(text, 99), (2, 2));
        assert_eq!(span(text, 0), (1, 1));
    }

    #[test]
    fn test_unbalanced_close_paren_does_not_hide_later_starts() {
        let text = "SELECT a)) FROM t\nSELECT b FROM u";
        assert_eq!(starts(text), vec![1, 2]);
    }

    #[test]
    fn test_semicolon_inside_parens_does_not_end_span() {
        let text = "SELECT (1;\n2)\nFROM t;";
        assert_eq!(span(text, 1), (1, 3));
    }

    #[test]
    fn test_every_line_of_a_statement_has_the_same_span() {
        let text = "SELECT (1;\n2)\nFROM t;\nSELECT 3;";
        for line in 1..=3 {
            assert_eq!(span(text, line), (1, 3), "line {line}");
        }
        assert_eq!(span(text, 4), (4, 4));
    }

    #[test]
    fn test_unclosed_paren_does_not_swallow_later_statements() {
        let text = "SELECT (1;\nSELECT 2;\nSELECT 3;";
        assert_eq!(span(text, 3), (3, 3));
    }
}
