//! Human-readable output formatting.

use super::Report;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use sqlsense_core::{Documentation, Range, Suggestion, SuggestionKind};
use std::fmt::Write;

/// Format a report as human-readable text with optional colors.
pub fn format_table(report: &Report, quiet: bool, use_colors: bool) -> String {
    let colored = use_colors && std::io::stdout().is_terminal();
    let mut out = String::new();

    match report {
        Report::Complete {
            items,
            replace_range,
        } => write_completions(&mut out, items, *replace_range, quiet, colored),
        Report::Hover { documentation } => {
            write_hover(&mut out, documentation.as_ref(), quiet, colored)
        }
        Report::Span { span } => {
            writeln!(out, "{}-{}", span.start_line, span.end_line).unwrap();
        }
        Report::Starts { starts } => {
            for line in starts {
                writeln!(out, "{line}").unwrap();
            }
        }
    }

    out
}

fn write_completions(
    out: &mut String,
    items: &[Suggestion],
    replace_range: Range,
    quiet: bool,
    colored: bool,
) {
    if items.is_empty() {
        if !quiet {
            writeln!(out, "No suggestions.").unwrap();
        }
        return;
    }

    let width = items
        .iter()
        .map(|item| item.label.chars().count())
        .max()
        .unwrap_or(0);

    for item in items {
        let kind = kind_label(item.kind);
        let detail = item.detail.as_deref().unwrap_or("");
        if colored {
            writeln!(
                out,
                "{:<width$}  {:<8}  {}",
                item.label.bold(),
                kind.cyan(),
                detail.dimmed()
            )
            .unwrap();
        } else {
            writeln!(out, "{:<width$}  {:<8}  {}", item.label, kind, detail).unwrap();
        }
    }

    if !quiet {
        let range = format!(
            "replaces {}:{}-{}:{}",
            replace_range.start.line,
            replace_range.start.column,
            replace_range.end.line,
            replace_range.end.column
        );
        writeln!(out).unwrap();
        if colored {
            writeln!(out, "{} suggestions, {}", items.len(), range.dimmed()).unwrap();
        } else {
            writeln!(out, "{} suggestions, {range}", items.len()).unwrap();
        }
    }
}

fn write_hover(out: &mut String, documentation: Option<&Documentation>, quiet: bool, colored: bool) {
    let Some(doc) = documentation else {
        if !quiet {
            writeln!(out, "Nothing to document here.").unwrap();
        }
        return;
    };

    // Headings are the only markdown worth highlighting on a terminal.
    for line in doc.contents.lines() {
        if colored && line.starts_with('#') {
            writeln!(out, "{}", line.bold()).unwrap();
        } else {
            writeln!(out, "{line}").unwrap();
        }
    }
}

fn kind_label(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::Keyword => "keyword",
        SuggestionKind::Table => "table",
        SuggestionKind::Column => "column",
        SuggestionKind::Function => "function",
        SuggestionKind::Variable => "alias",
        SuggestionKind::Snippet => "snippet",
    }
}
