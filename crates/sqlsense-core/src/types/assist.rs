//! Request-scoped values produced while analyzing the buffer around a cursor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Range;

/// Line range (1-based, inclusive) covered by one statement of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl StatementSpan {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Logical clause of a SELECT-family statement the cursor sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum ClauseContext {
    /// No `SELECT` in the prefix; the DML track or the global fallback applies.
    #[default]
    None,
    Select,
    From,
    Join,
    On,
    Where,
    GroupBy,
    Having,
    OrderBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DmlVerb {
    Insert,
    Update,
    Delete,
}

/// DML statement detected in a prefix that has no `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DmlContext {
    pub verb: DmlVerb,
    /// Target table, once its name has been typed completely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub has_from: bool,
    pub has_set: bool,
    pub has_where: bool,
}

/// Kind of the statement the best-effort parse produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum StatementKind {
    /// The fragment could not be parsed.
    #[default]
    Unknown,
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

/// One `FROM`/`JOIN` entry: the name it is referenced by and the relation behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeEntry {
    /// Explicit alias, or the bare table name when unaliased.
    pub alias: String,
    pub table: String,
}

/// Columns exposed by a CTE or a derived table of the active statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRelation {
    pub name: String,
    pub columns: Vec<String>,
    /// Tables whose catalog columns a `*` projection pulls in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wildcard_tables: Vec<String>,
}

/// Table scope of the active statement. Empty when the fragment did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub kind: StatementKind,
    pub entries: Vec<ScopeEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<DerivedRelation>,
}

impl Scope {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves an alias (or bare table name) to the table it stands for.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.alias.eq_ignore_ascii_case(alias))
            .map(|entry| entry.table.as_str())
    }

    /// Adds an entry unless the alias is already taken; the first binding wins.
    pub fn insert(&mut self, alias: impl Into<String>, table: impl Into<String>) {
        let alias = alias.into();
        if self.resolve(&alias).is_none() {
            self.entries.push(ScopeEntry {
                alias,
                table: table.into(),
            });
        }
    }

    pub fn derived_relation(&self, name: &str) -> Option<&DerivedRelation> {
        self.derived
            .iter()
            .find(|relation| relation.name.eq_ignore_ascii_case(name))
    }
}

/// The word being typed at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CursorToken {
    /// Identifier characters immediately before the cursor.
    pub partial: String,
    /// Identifier before a `.` that precedes `partial` (`u` in `u.na|`),
    /// without its quotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// A `.` directly precedes `partial`, whether or not a qualifier was found.
    #[serde(default)]
    pub after_dot: bool,
}

/// Ranked candidates together with the range an accepted one replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Completions {
    pub items: Vec<Suggestion>,
    pub replace_range: Range,
}

/// Everything derived from the buffer for one completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionContext {
    pub span: StatementSpan,
    pub clause: ClauseContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dml: Option<DmlContext>,
    pub scope: Scope,
    pub token: CursorToken,
    /// Range the accepted suggestion replaces (the partial token).
    pub replace_range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    Keyword,
    Table,
    Column,
    Function,
    Variable,
    Snippet,
}

/// A completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub label: String,
    pub kind: SuggestionKind,
    pub insert_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Position in the ranked list; lower sorts first.
    pub sort_rank: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DocumentationKind {
    Table,
    View,
    Function,
}

/// Hover documentation for the token under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Documentation {
    pub kind: DocumentationKind,
    /// Catalog name of the documented object.
    pub name: String,
    /// Markdown body.
    pub contents: String,
    /// Buffer range of the hovered word.
    pub range: Range,
}

impl Documentation {
    pub(crate) fn new(
        kind: DocumentationKind,
        name: impl Into<String>,
        contents: String,
        range: Range,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            contents,
            range,
        }
    }
}
