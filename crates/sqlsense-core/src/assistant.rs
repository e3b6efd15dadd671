//! Public entry points: completion, hover and statement spans over a buffer.
//!
//! Each request recomputes everything from the buffer snapshot it is handed;
//! an [`SqlAssistant`] holds only the catalog index, the configuration and
//! the fragment parser, none of which change between requests.

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::catalog::CatalogIndex;
use crate::classifier::{classify, detect_dml};
use crate::completion::{builtin_functions, Compositor};
use crate::hover::HoverResolver;
use crate::parser::{FragmentParser, SqlparserParser};
use crate::scope::resolve_scope;
use crate::segmenter;
use crate::types::{
    AssistConfig, Catalog, ClauseContext, CompletionContext, Completions, CursorToken,
    Documentation, Position, Range, StatementSpan, Suggestion,
};

/// Completion and hover engine for one catalog.
#[derive(Debug, Clone)]
pub struct SqlAssistant<P = SqlparserParser> {
    index: CatalogIndex,
    config: AssistConfig,
    parser: P,
}

impl SqlAssistant<SqlparserParser> {
    /// Indexes `catalog` and parses fragments with sqlparser.
    pub fn new(catalog: &Catalog, config: AssistConfig) -> Self {
        Self::with_parser(catalog, config, SqlparserParser)
    }
}

impl<P: FragmentParser> SqlAssistant<P> {
    pub fn with_parser(catalog: &Catalog, config: AssistConfig, parser: P) -> Self {
        let index = if config.builtin_functions {
            CatalogIndex::with_builtins(catalog, builtin_functions())
        } else {
            CatalogIndex::new(catalog)
        };
        Self {
            index,
            config,
            parser,
        }
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    /// Everything the compositor needs for a completion at `cursor`.
    pub fn completion_context<B>(&self, buffer: &B, cursor: Position) -> CompletionContext
    where
        B: TextBuffer + ?Sized,
    {
        let cursor = clamp_position(buffer, cursor);
        let span = segmenter::statement_span(buffer, cursor.line);
        let statement_start = Position::line_start(span.start_line);

        let prefix = buffer.text_in_range(Range::new(statement_start, cursor));
        let statement = buffer.text_in_range(Range::new(
            statement_start,
            Position::line_end(span.end_line),
        ));

        let clause = classify(&prefix);
        let dml = if clause == ClauseContext::None {
            detect_dml(&prefix)
        } else {
            None
        };
        let scope = resolve_scope(&self.parser, &statement, self.config.dialect);
        let (token, replace_range) = cursor_token(buffer.line_text(cursor.line), cursor);

        CompletionContext {
            span,
            clause,
            dml,
            scope,
            token,
            replace_range,
        }
    }

    /// Ranked completion candidates at `cursor`. Never fails.
    pub fn get_completions<B>(&self, buffer: &B, cursor: Position) -> Vec<Suggestion>
    where
        B: TextBuffer + ?Sized,
    {
        self.complete(buffer, cursor).items
    }

    /// Completion candidates plus the range an accepted candidate replaces.
    pub fn complete<B>(&self, buffer: &B, cursor: Position) -> Completions
    where
        B: TextBuffer + ?Sized,
    {
        let context = self.completion_context(buffer, cursor);
        let items = Compositor::new(&self.index, &self.config).suggest(&context);

        #[cfg(feature = "tracing")]
        debug!(
            line = cursor.line,
            column = cursor.column,
            count = items.len(),
            "completions composed"
        );

        Completions {
            items,
            replace_range: context.replace_range,
        }
    }

    /// Documentation for the word under `pointer`, if it names something known.
    pub fn get_hover<B>(&self, buffer: &B, pointer: Position) -> Option<Documentation>
    where
        B: TextBuffer + ?Sized,
    {
        let pointer = clamp_position(buffer, pointer);
        let (word, range) = word_at(buffer.line_text(pointer.line), pointer)?;

        let span = segmenter::statement_span(buffer, pointer.line);
        let statement_start = Position::line_start(span.start_line);
        let prefix = buffer.text_in_range(Range::new(statement_start, range.start));

        HoverResolver::new(&self.index).resolve(&word, &prefix, range, || {
            let statement = buffer.text_in_range(Range::new(
                statement_start,
                Position::line_end(span.end_line),
            ));
            resolve_scope(&self.parser, &statement, self.config.dialect)
        })
    }

    /// Line span of the statement containing `line`.
    pub fn get_statement_span<B>(&self, buffer: &B, line: usize) -> StatementSpan
    where
        B: TextBuffer + ?Sized,
    {
        segmenter::statement_span(buffer, line)
    }

    /// Lines where top-level statements begin, for gutter consumers.
    pub fn statement_starts<B>(&self, buffer: &B) -> Vec<usize>
    where
        B: TextBuffer + ?Sized,
    {
        segmenter::statement_starts(buffer)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Moves `position` into the buffer: lines past the end map to the last line,
/// columns past the end of a line map to just after its last character.
fn clamp_position<B: TextBuffer + ?Sized>(buffer: &B, position: Position) -> Position {
    let line = position.line.clamp(1, buffer.line_count().max(1));
    let width = buffer.line_text(line).chars().count();
    Position::new(line, position.column.clamp(1, width + 1))
}

/// The identifier being typed before `cursor`, its `qualifier.` if any, and
/// the range a completion replaces.
fn cursor_token(line: &str, cursor: Position) -> (CursorToken, Range) {
    let before: Vec<char> = line.chars().take(cursor.column - 1).collect();

    let partial_start = word_start(&before, before.len());
    let partial: String = before[partial_start..].iter().collect();

    let dot = partial_start
        .checked_sub(1)
        .filter(|&dot| before[dot] == '.');
    let qualifier = dot.and_then(|dot| qualifier_before(&before, dot));

    let replace_start = Position::new(cursor.line, partial_start + 1);
    (
        CursorToken {
            partial,
            qualifier,
            after_dot: dot.is_some(),
        },
        Range::new(replace_start, cursor),
    )
}

/// The identifier ending right before `chars[dot]`, unquoted when written as
/// `"u"`, `` `u` `` or `[u]`.
fn qualifier_before(chars: &[char], dot: usize) -> Option<String> {
    let close = *chars.get(dot.checked_sub(1)?)?;
    let open = match close {
        '"' | '`' => close,
        ']' => '[',
        _ => {
            let start = word_start(chars, dot);
            return (start < dot).then(|| chars[start..dot].iter().collect());
        }
    };

    let inner_end = dot - 1;
    let open_at = chars[..inner_end].iter().rposition(|&ch| ch == open)?;
    (open_at + 1 < inner_end).then(|| chars[open_at + 1..inner_end].iter().collect())
}

fn word_start(chars: &[char], end: usize) -> usize {
    let mut start = end;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    start
}

/// The identifier touching `pointer` (under it or just before it).
fn word_at(line: &str, pointer: Position) -> Option<(String, Range)> {
    let chars: Vec<char> = line.chars().collect();
    let at = (pointer.column - 1).min(chars.len());

    let start = word_start(&chars, at);
    let mut end = at;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }
    if start == end {
        return None;
    }

    let word: String = chars[start..end].iter().collect();
    let range = Range::new(
        Position::new(pointer.line, start + 1),
        Position::new(pointer.line, end + 1),
    );
    Some((word, range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_token_after_dot() {
        let (token, range) = cursor_token("SELECT u. FROM users u", Position::new(1, 10));
        assert_eq!(token.partial, "");
        assert_eq!(token.qualifier.as_deref(), Some("u"));
        assert_eq!(range.start, Position::new(1, 10));
    }

    #[test]
    fn test_cursor_token_partial_with_qualifier() {
        let (token, range) = cursor_token("  SELECT usr.na", Position::new(3, 16));
        assert_eq!(token.partial, "na");
        assert_eq!(token.qualifier.as_deref(), Some("usr"));
        assert_eq!(range, Range::new(Position::new(3, 14), Position::new(3, 16)));
    }

    #[test]
    fn test_cursor_token_plain_word_and_whitespace() {
        let (token, _) = cursor_token("SELECT na", Position::new(1, 10));
        assert_eq!(token.partial, "na");
        assert_eq!(token.qualifier, None);

        let (token, _) = cursor_token("SELECT ", Position::new(1, 8));
        assert_eq!(token.partial, "");
        assert_eq!(token.qualifier, None);

        let (token, _) = cursor_token("SELECT .x", Position::new(1, 10));
        assert_eq!(token.partial, "x");
        assert_eq!(token.qualifier, None);
        assert!(token.after_dot);

        let (token, _) = cursor_token("SELECT x", Position::new(1, 9));
        assert!(!token.after_dot);
    }

    #[test]
    fn test_cursor_token_dot_without_identifier() {
        for line in ["SELECT (.", "SELECT u .", "SELECT ''.", "SELECT \"\"."] {
            let column = line.chars().count() + 1;
            let (token, _) = cursor_token(line, Position::new(1, column));
            assert!(token.after_dot, "{line}");
            assert_eq!(token.qualifier, None, "{line}");
        }
    }

    #[test]
    fn test_cursor_token_quoted_qualifier() {
        let (token, _) = cursor_token("SELECT \"u\".na", Position::new(1, 14));
        assert_eq!(token.qualifier.as_deref(), Some("u"));
        assert_eq!(token.partial, "na");

        let (token, _) = cursor_token("SELECT [order items].", Position::new(1, 22));
        assert_eq!(token.qualifier.as_deref(), Some("order items"));

        let (token, _) = cursor_token("SELECT `u`.", Position::new(1, 12));
        assert_eq!(token.qualifier.as_deref(), Some("u"));
    }

    #[test]
    fn test_word_at_pointer() {
        let (word, range) = word_at("SELECT * FROM users u", Position::new(1, 16)).unwrap();
        assert_eq!(word, "users");
        assert_eq!(range, Range::new(Position::new(1, 15), Position::new(1, 20)));

        // Just past the end of a word still hovers it.
        let (word, _) = word_at("FROM users", Position::new(1, 11)).unwrap();
        assert_eq!(word, "users");

        assert!(word_at("a  b", Position::new(1, 3)).is_none());
        assert!(word_at("", Position::new(1, 1)).is_none());
    }

    #[test]
    fn test_clamp_position() {
        let buffer = crate::buffer::BufferSnapshot::new("SELECT\nFROM t");
        assert_eq!(clamp_position(&buffer, Position::new(9, 99)), Position::new(2, 7));
        assert_eq!(clamp_position(&buffer, Position::new(0, 0)), Position::new(1, 1));
    }
}
