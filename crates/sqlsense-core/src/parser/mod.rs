//! Seam to the full-grammar SQL parser.
//!
//! The completion engine only ever needs a best-effort parse of a single
//! statement fragment. [`FragmentParser`] abstracts the parser so embedders
//! can substitute their own; [`SqlparserParser`] is the default.

use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::error::ParseError;
use crate::types::Dialect;

pub(crate) mod repair;

/// Parses a SQL fragment with a given dialect.
///
/// Failures are expected while the user types; callers treat an error as
/// "no structure available".
pub trait FragmentParser {
    fn parse(&self, sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError>;
}

impl<F> FragmentParser for F
where
    F: Fn(&str, Dialect) -> Result<Vec<Statement>, ParseError>,
{
    fn parse(&self, sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
        self(sql, dialect)
    }
}

/// [`FragmentParser`] backed by `sqlparser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlparserParser;

impl FragmentParser for SqlparserParser {
    fn parse(&self, sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
        parse_sql_with_dialect(sql, dialect)
    }
}

/// Parse SQL using the specified dialect
pub fn parse_sql_with_dialect(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    match Parser::parse_sql(sqlparser_dialect.as_ref(), sql) {
        Ok(statements) => Ok(statements),
        Err(primary_err) => {
            // Generic rejects Postgres casts and JSON operators that show up in
            // everyday queries.
            if matches!(dialect, Dialect::Generic) && looks_like_postgres_syntax(sql) {
                let postgres = PostgreSqlDialect {};
                if let Ok(statements) = Parser::parse_sql(&postgres, sql) {
                    return Ok(statements);
                }
            }
            Err(ParseError::from(primary_err).with_dialect(dialect))
        }
    }
}

fn looks_like_postgres_syntax(sql: &str) -> bool {
    sql.contains("::") || sql.contains("->") || sql.contains("?|") || sql.contains("?&")
}
