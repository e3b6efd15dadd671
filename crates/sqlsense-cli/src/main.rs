//! sqlsense CLI - SQL completion and hover from the command line

use sqlsense_cli::cli;
use sqlsense_cli::input;
use sqlsense_cli::output;

use anyhow::Result;
use clap::Parser;
use sqlsense_core::{BufferSnapshot, SqlAssistant};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Args, Mode, OutputFormat};
use output::{format_json, format_table, Report};

/// Nothing found under `--strict`.
const EXIT_FAILURE: u8 = 1;
/// Unreadable input, catalog or configuration.
const EXIT_CONFIG_ERROR: u8 = 66;

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "SQLSENSE_LOG";

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(found_nothing) => {
            if found_nothing {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("sqlsense: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("sqlsense: warning: logging disabled: {e}");
    }
}

/// Returns true when `--strict` is set and the lookup found nothing.
fn run(args: Args) -> Result<bool> {
    let sql = input::read_sql(args.file.as_deref())?;
    let catalog = input::load_catalog(args.catalog.as_deref())?;
    let mut config = input::load_config(args.config.as_deref())?;
    if let Some(dialect) = args.dialect {
        config = config.with_dialect(dialect.into());
    }

    if args.catalog.is_none() && !args.quiet && matches!(args.mode, Mode::Complete | Mode::Hover)
    {
        eprintln!("sqlsense: warning: no catalog given; only keywords and built-in functions are known");
    }

    let buffer = BufferSnapshot::new(sql);
    let assistant = SqlAssistant::new(&catalog, config);
    let cursor = args.at.unwrap_or_else(|| input::end_of_buffer(&buffer));
    debug!(line = cursor.line, column = cursor.column, mode = ?args.mode, "running lookup");

    let report = match args.mode {
        Mode::Complete => {
            let completions = assistant.complete(&buffer, cursor);
            Report::Complete {
                items: completions.items,
                replace_range: completions.replace_range,
            }
        }
        Mode::Hover => Report::Hover {
            documentation: assistant.get_hover(&buffer, cursor),
        },
        Mode::Span => Report::Span {
            span: assistant.get_statement_span(&buffer, cursor.line),
        },
        Mode::Starts => Report::Starts {
            starts: assistant.statement_starts(&buffer),
        },
    };

    let rendered = match args.format {
        OutputFormat::Json => format_json(&report, args.compact),
        OutputFormat::Table => format_table(&report, args.quiet, true),
    };

    let mut stdout = io::stdout().lock();
    write!(stdout, "{rendered}")?;
    if matches!(args.format, OutputFormat::Json) {
        writeln!(stdout)?;
    }

    Ok(args.strict && report.is_empty())
}
