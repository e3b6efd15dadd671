//! Built-in SQL function table.
//!
//! Built once on first use with `LazyLock`. Entries carry signatures and short
//! docs so function suggestions and hovers read the same as catalog functions.

use std::sync::LazyLock;

use crate::types::{Function, Parameter, Suggestion, SuggestionKind};

#[rustfmt::skip]
static BUILTIN_FUNCTIONS: LazyLock<Vec<Function>> = LazyLock::new(|| {
    vec![
        builtin("COUNT", &[("expr", "ANY")], "BIGINT", "Number of rows, or of non-null values of `expr`.", &[]),
        builtin("SUM", &[("expr", "NUMERIC")], "NUMERIC", "Sum of all non-null values.", &[]),
        builtin("AVG", &[("expr", "NUMERIC")], "NUMERIC", "Average of all non-null values.", &[]),
        builtin("MIN", &[("expr", "ANY")], "ANY", "Smallest non-null value.", &[]),
        builtin("MAX", &[("expr", "ANY")], "ANY", "Largest non-null value.", &[]),
        builtin("COALESCE", &[("value", "ANY"), ("fallback", "ANY")], "ANY", "First argument that is not NULL.", &[]),
        builtin("NULLIF", &[("a", "ANY"), ("b", "ANY")], "ANY", "NULL when `a` equals `b`, otherwise `a`.", &[]),
        builtin("CONCAT", &[("str", "VARCHAR"), ("other", "VARCHAR")], "VARCHAR", "Concatenates its arguments.", &[]),
        builtin("LENGTH", &[("str", "VARCHAR")], "INT", "Number of characters in `str`.", &[]),
        builtin("UPPER", &[("str", "VARCHAR")], "VARCHAR", "Converts `str` to upper case.", &[]),
        builtin("LOWER", &[("str", "VARCHAR")], "VARCHAR", "Converts `str` to lower case.", &[]),
        builtin("TRIM", &[("str", "VARCHAR")], "VARCHAR", "Removes leading and trailing spaces.", &[]),
        builtin("SUBSTRING", &[("str", "VARCHAR"), ("start", "INT"), ("length", "INT")], "VARCHAR", "Part of `str` starting at `start`.", &[]),
        builtin("REPLACE", &[("str", "VARCHAR"), ("from", "VARCHAR"), ("to", "VARCHAR")], "VARCHAR", "Replaces every occurrence of `from` with `to`.", &[]),
        builtin("ROUND", &[("number", "NUMERIC"), ("digits", "INT")], "NUMERIC", "Rounds `number` to `digits` decimal places.", &[]),
        builtin("ABS", &[("number", "NUMERIC")], "NUMERIC", "Absolute value.", &[]),
        builtin("NOW", &[], "TIMESTAMP", "Current date and time.", &[]),
        builtin("CURRENT_DATE", &[], "DATE", "Current date.", &[]),
        builtin("IFNULL", &[("expr", "ANY"), ("fallback", "ANY")], "ANY", "`fallback` when `expr` is NULL.", &["mysql", "sqlite"]),
        builtin("DATE_FORMAT", &[("date", "DATETIME"), ("format", "VARCHAR")], "VARCHAR", "Formats a date with a MySQL format string.", &["mysql"]),
        builtin("GROUP_CONCAT", &[("expr", "ANY")], "VARCHAR", "Concatenates the values of a group.", &["mysql", "sqlite"]),
        builtin("STRING_AGG", &[("expr", "VARCHAR"), ("delimiter", "VARCHAR")], "VARCHAR", "Concatenates the values of a group with a delimiter.", &["postgres", "mssql", "duckdb"]),
        builtin("TO_CHAR", &[("value", "ANY"), ("format", "VARCHAR")], "VARCHAR", "Formats a value as text.", &["postgres", "redshift", "snowflake"]),
    ]
});

fn builtin(
    name: &str,
    parameters: &[(&str, &str)],
    return_type: &str,
    doc: &str,
    support: &[&str],
) -> Function {
    Function {
        name: name.to_string(),
        parameters: parameters
            .iter()
            .zip(1..)
            .map(|((name, ty), order)| Parameter {
                name: name.to_string(),
                data_type: Some(ty.to_string()),
                order,
            })
            .collect(),
        return_type: Some(return_type.to_string()),
        doc: Some(doc.to_string()),
        ddl: None,
        support: support.iter().map(|s| s.to_string()).collect(),
    }
}

/// The static function catalog, in suggestion order.
pub fn builtin_functions() -> &'static [Function] {
    &BUILTIN_FUNCTIONS
}

pub(crate) fn function_suggestion(function: &Function) -> Suggestion {
    Suggestion {
        label: function.name.clone(),
        kind: SuggestionKind::Function,
        insert_text: format!("{}()", function.name),
        detail: Some(function.signature()),
        documentation: function.doc.clone(),
        sort_rank: 0,
    }
}
