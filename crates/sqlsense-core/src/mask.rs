//! Masking of comments, string literals, and quoted identifiers.
//!
//! Keyword and delimiter scans run over masked text so that a `;`, `(`, or
//! `WHERE` inside a literal or a comment is never mistaken for structure.
//! Masking preserves byte length and newlines, so offsets and line numbers in
//! the masked text match the original.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    LineComment,
    BlockComment,
    Quoted(char),
}

/// Replaces comments entirely, and the interior of quoted text, with spaces.
///
/// Quote characters themselves are kept. Unterminated constructs mask to the
/// end of the input, which is the right answer while the user is still typing.
pub(crate) fn mask_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut state = LexState::Code;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            LexState::Code => match ch {
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    out.push_str("  ");
                    state = LexState::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = LexState::BlockComment;
                }
                '\'' | '"' | '`' => {
                    out.push(ch);
                    state = LexState::Quoted(ch);
                }
                _ => out.push(ch),
            },
            LexState::LineComment => {
                if ch == '\n' {
                    out.push('\n');
                    state = LexState::Code;
                } else {
                    blank(&mut out, ch);
                }
            }
            LexState::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = LexState::Code;
                } else {
                    blank(&mut out, ch);
                }
            }
            LexState::Quoted(quote) => {
                if ch == '\\' && quote == '\'' {
                    blank(&mut out, ch);
                    if let Some(escaped) = chars.next() {
                        blank(&mut out, escaped);
                    }
                } else if ch == quote {
                    if chars.peek() == Some(&quote) {
                        chars.next();
                        out.push_str("  ");
                    } else {
                        out.push(ch);
                        state = LexState::Code;
                    }
                } else {
                    blank(&mut out, ch);
                }
            }
        }
    }

    out
}

/// Pushes spaces for a masked character, keeping newlines so line structure survives.
fn blank(out: &mut String, ch: char) {
    if ch == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat(' ').take(ch.len_utf8()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spaces(n: usize) -> String {
        " ".repeat(n)
    }

    #[test]
    fn test_masks_line_comment() {
        let masked = mask_sql("SELECT 1; -- WHERE x;\nFROM t");
        assert_eq!(masked, format!("SELECT 1;{}\nFROM t", spaces(12)));
    }

    #[test]
    fn test_masks_block_comment_across_lines() {
        let masked = mask_sql("SELECT /* ;\n( */ 1");
        assert_eq!(masked, format!("SELECT {}\n{} 1", spaces(4), spaces(4)));
    }

    #[test]
    fn test_masks_string_interior_and_keeps_quotes() {
        let masked = mask_sql("WHERE name = 'a;b' AND x = 1");
        assert_eq!(masked, "WHERE name = '   ' AND x = 1");
    }

    #[test]
    fn test_doubled_and_escaped_quotes() {
        assert_eq!(mask_sql("'it''s';"), format!("'{}';", spaces(5)));
        assert_eq!(mask_sql(r"'it\'s';"), format!("'{}';", spaces(5)));
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            mask_sql("\"order by\" FROM"),
            format!("\"{}\" FROM", spaces(8))
        );
        assert_eq!(mask_sql("`where`"), format!("`{}`", spaces(5)));
    }

    #[test]
    fn test_unterminated_string_masks_to_end() {
        assert_eq!(
            mask_sql("SELECT 'abc; (\nFROM"),
            format!("SELECT '{}\n{}", spaces(6), spaces(4))
        );
    }

    #[test]
    fn test_preserves_byte_length_with_multibyte() {
        let sql = "SELECT 'héllo' -- ünïcode\nFROM t";
        let masked = mask_sql(sql);
        assert_eq!(masked.len(), sql.len());
        assert_eq!(masked.lines().count(), sql.lines().count());
    }
}
