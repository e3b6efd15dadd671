//! Static keyword tables.

use crate::types::{Suggestion, SuggestionKind};

/// Global keyword list offered when no clause or DML verb applies.
pub const SQL_KEYWORDS: &[&str] = &[
    "SELECT",
    "FROM",
    "WHERE",
    "INSERT",
    "UPDATE",
    "DELETE",
    "CREATE",
    "DROP",
    "ALTER",
    "TABLE",
    "DATABASE",
    "INDEX",
    "GROUP BY",
    "ORDER BY",
    "HAVING",
    "JOIN",
    "LEFT JOIN",
    "RIGHT JOIN",
    "INNER JOIN",
    "LIMIT",
    "OFFSET",
    "UNION",
    "AND",
    "OR",
    "NOT",
    "IN",
    "BETWEEN",
    "LIKE",
    "IS NULL",
    "IS NOT NULL",
];

/// Boolean and predicate keywords for `ON`, `WHERE` and `HAVING`.
pub const PREDICATE_KEYWORDS: &[&str] = &[
    "AND",
    "OR",
    "NOT",
    "IN",
    "BETWEEN",
    "LIKE",
    "IS NULL",
    "IS NOT NULL",
];

pub const JOIN_KEYWORDS: &[&str] = &["JOIN", "LEFT JOIN", "RIGHT JOIN", "INNER JOIN"];

pub const ORDER_KEYWORDS: &[&str] = &["ASC", "DESC"];

/// Label of the `SELECT ... FROM ...` snippet.
pub const SELECT_SNIPPET_LABEL: &str = "sel";

const SELECT_SNIPPET_BODY: &str = "SELECT ${1:*} FROM ${2:table_name}";

pub(crate) fn keyword_suggestion(keyword: &str) -> Suggestion {
    Suggestion {
        label: keyword.to_string(),
        kind: SuggestionKind::Keyword,
        insert_text: keyword.to_string(),
        detail: Some("keyword".to_string()),
        documentation: Some(format!("SQL keyword: {keyword}")),
        sort_rank: 0,
    }
}

pub(crate) fn select_snippet() -> Suggestion {
    Suggestion {
        label: SELECT_SNIPPET_LABEL.to_string(),
        kind: SuggestionKind::Snippet,
        insert_text: SELECT_SNIPPET_BODY.to_string(),
        detail: Some("snippet".to_string()),
        documentation: Some("Select all columns from a table".to_string()),
        sort_rank: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_keywords_are_global_keywords() {
        for keyword in PREDICATE_KEYWORDS.iter().chain(JOIN_KEYWORDS) {
            assert!(SQL_KEYWORDS.contains(keyword), "{keyword} missing");
        }
    }

    #[test]
    fn test_keyword_suggestion() {
        let suggestion = keyword_suggestion("GROUP BY");
        assert_eq!(suggestion.kind, SuggestionKind::Keyword);
        assert_eq!(suggestion.insert_text, "GROUP BY");
    }
}
