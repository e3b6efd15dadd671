//! Error types for the completion engine.
//!
//! # Error Handling Strategy
//!
//! No public completion, hover, or segmentation entry point returns an error: a
//! stray keystroke must never interrupt editing. Errors exist only at two seams:
//!
//! - [`ParseError`]: produced by a [`crate::parser::FragmentParser`] when a
//!   statement fragment cannot be parsed. The scope resolver recovers from it
//!   locally by falling back to an empty scope.
//!
//! - [`CatalogError`]: produced while loading a catalog from JSON. Loading is a
//!   convenience for embedders; indexing an already-built catalog never fails.

use crate::types::Dialect;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::trace;

/// Error reported by the fragment parser.
///
/// Preserves the position sqlparser reports in its message when one is present.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Location of the failure within the fragment, if known.
    pub position: Option<ErrorPosition>,
    /// Dialect the fragment was parsed with.
    pub dialect: Option<Dialect>,
    /// Coarse category of the failure.
    pub kind: ParseErrorKind,
}

/// Line and column of a parse failure inside the parsed fragment (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPosition {
    pub line: usize,
    pub column: usize,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    /// Unexpected token or character in input.
    #[default]
    SyntaxError,
    /// Input ended while a clause was still open. The common case while typing.
    UnexpectedEof,
    /// Lexer/tokenization error.
    LexerError,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Extracts `Line: X, Column: Y` from a sqlparser message.
    ///
    /// Coupled to sqlparser's message format; returns `None` when the format
    /// is not recognized.
    fn position_from_message(message: &str) -> Option<ErrorPosition> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        let position = re.captures(message).and_then(|caps| {
            let line = caps.get(1)?.as_str().parse().ok()?;
            let column = caps.get(2)?.as_str().parse().ok()?;
            Some(ErrorPosition { line, column })
        });

        #[cfg(feature = "tracing")]
        if position.is_none() && message.contains("Line") {
            trace!(message, "parse error carries no recognizable position");
        }

        position
    }

    fn kind_from_message(message: &str) -> ParseErrorKind {
        let lower = message.to_lowercase();
        if lower.contains("eof") || lower.contains("unexpected end") {
            ParseErrorKind::UnexpectedEof
        } else if lower.contains("tokenizer") || lower.contains("unterminated") {
            ParseErrorKind::LexerError
        } else {
            ParseErrorKind::SyntaxError
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        Self {
            position: Self::position_from_message(&message),
            kind: Self::kind_from_message(&message),
            dialect: None,
            message,
        }
    }
}

/// Error raised while loading or validating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate table `{table}` in database `{database}`")]
    DuplicateTable { database: String, table: String },

    #[error("column order of table `{table}` is not strictly increasing at column `{column}`")]
    ColumnOrder { table: String, column: String },
}
