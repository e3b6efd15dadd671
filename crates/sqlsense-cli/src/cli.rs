//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use sqlsense_core::Position;
use std::path::PathBuf;

/// sqlsense - context-aware SQL completion and hover
#[derive(Parser, Debug)]
#[command(name = "sqlsense")]
#[command(
    about = "Suggest completions, hover docs and statement spans for a SQL buffer",
    long_about = None
)]
#[command(version)]
pub struct Args {
    /// SQL file to inspect (reads from stdin if omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Catalog JSON file describing databases, tables, columns and functions
    #[arg(short = 'C', long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Assistant configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQL dialect (overrides the configuration file)
    #[arg(short, long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Cursor position as LINE:COLUMN, 1-based (defaults to the end of the buffer)
    #[arg(short, long, value_name = "LINE:COL", value_parser = parse_position)]
    pub at: Option<Position>,

    /// What to compute at the cursor
    #[arg(short, long, default_value = "complete", value_enum)]
    pub mode: Mode,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Log engine decisions (clause, scope, parse strategy) to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Exit with status 1 when the lookup produces nothing
    #[arg(long)]
    pub strict: bool,
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for sqlsense_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => sqlsense_core::Dialect::Generic,
            DialectArg::Ansi => sqlsense_core::Dialect::Ansi,
            DialectArg::Bigquery => sqlsense_core::Dialect::Bigquery,
            DialectArg::Clickhouse => sqlsense_core::Dialect::Clickhouse,
            DialectArg::Databricks => sqlsense_core::Dialect::Databricks,
            DialectArg::Duckdb => sqlsense_core::Dialect::Duckdb,
            DialectArg::Hive => sqlsense_core::Dialect::Hive,
            DialectArg::Mssql => sqlsense_core::Dialect::Mssql,
            DialectArg::Mysql => sqlsense_core::Dialect::Mysql,
            DialectArg::Postgres => sqlsense_core::Dialect::Postgres,
            DialectArg::Redshift => sqlsense_core::Dialect::Redshift,
            DialectArg::Snowflake => sqlsense_core::Dialect::Snowflake,
            DialectArg::Sqlite => sqlsense_core::Dialect::Sqlite,
        }
    }
}

/// Lookup to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Ranked completion candidates
    Complete,
    /// Documentation for the word under the cursor
    Hover,
    /// Line span of the statement containing the cursor
    Span,
    /// Lines where top-level statements begin
    Starts,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Table,
    /// JSON output
    Json,
}

/// Parses `LINE:COLUMN` into a 1-based position.
pub fn parse_position(value: &str) -> Result<Position, String> {
    let (line, column) = value
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COLUMN, got `{value}`"))?;
    let line: usize = line
        .trim()
        .parse()
        .map_err(|_| format!("invalid line number `{line}`"))?;
    let column: usize = column
        .trim()
        .parse()
        .map_err(|_| format!("invalid column number `{column}`"))?;
    if line == 0 || column == 0 {
        return Err("line and column are 1-based".to_string());
    }
    Ok(Position::new(line, column))
}
