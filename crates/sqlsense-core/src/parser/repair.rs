//! Best-effort parsing of statements that are still being typed.
//!
//! Strategies run from cheapest to most destructive and the first success
//! wins:
//! 1. the statement as typed, minus a dangling clause keyword at its end
//! 2. the same text with minimal repairs applied
//! 3. progressively shorter prefixes cut before a clause keyword
//!
//! Keyword and parenthesis scans run over masked text, so nothing inside a
//! string literal or a comment is ever rewritten.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use sqlparser::ast::Statement;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use super::FragmentParser;
use crate::mask::mask_sql;
use crate::types::Dialect;

/// Maximum number of truncation attempts for pathological SQL.
const MAX_TRUNCATION_ATTEMPTS: usize = 50;

/// Maximum number of `)` appended when closing parentheses.
const MAX_PAREN_FIXES: usize = 20;

static DANGLING_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:LEFT\s+JOIN|RIGHT\s+JOIN|INNER\s+JOIN|JOIN|WHERE|GROUP\s+BY|ORDER\s+BY)\s*$",
    )
    .expect("Invalid regex pattern")
});

/// `u.`, `"u".` or `public.users.` with nothing typed after the dot. Quoted
/// parts are matched in masked form, where only the quote characters remain.
static DANGLING_QUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:\b[A-Za-z_][\w$]*|"[^"]*"|`[^`]*`)(?:\.(?:[A-Za-z_][\w$]*|"[^"]*"|`[^`]*`))*\.(\s|,|\)|$)"#,
    )
    .expect("Invalid regex pattern")
});

static EMPTY_PROJECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(SELECT)(\s+FROM)\b").expect("Invalid regex pattern")
});

static COMMA_BEFORE_FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),(\s*FROM)\b").expect("Invalid regex pattern"));

static TRUNCATION_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:WHERE|GROUP|HAVING|ORDER|LIMIT|ON)\b").expect("Invalid regex pattern")
});

/// Which strategy produced a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseStrategy {
    AsTyped,
    Repaired,
    Truncated,
}

#[derive(Debug, Clone)]
pub(crate) struct ParseOutcome {
    pub statements: Vec<Statement>,
    #[cfg_attr(not(any(test, feature = "tracing")), allow(dead_code))]
    pub strategy: ParseStrategy,
}

/// Strips a clause-opening keyword left dangling at the very end of `sql`.
pub(crate) fn trim_dangling_keyword(sql: &str) -> &str {
    let masked = mask_sql(sql);
    match DANGLING_KEYWORD_RE.find(&masked) {
        Some(m) => &sql[..m.start()],
        None => sql,
    }
}

/// Parses `sql` with the first strategy that succeeds, or returns `None`.
pub(crate) fn parse_best_effort<P>(parser: &P, sql: &str, dialect: Dialect) -> Option<ParseOutcome>
where
    P: FragmentParser + ?Sized,
{
    let cleaned = trim_dangling_keyword(sql);
    if cleaned.trim().is_empty() {
        return None;
    }

    if let Some(statements) = attempt(parser, cleaned, dialect) {
        return Some(outcome(statements, ParseStrategy::AsTyped));
    }

    let repaired = repair(cleaned);
    if repaired != cleaned {
        if let Some(statements) = attempt(parser, &repaired, dialect) {
            return Some(outcome(statements, ParseStrategy::Repaired));
        }
    }

    for cut in truncation_points(cleaned)
        .into_iter()
        .take(MAX_TRUNCATION_ATTEMPTS)
    {
        let candidate = trim_dangling_keyword(&cleaned[..cut]);
        if candidate.trim().is_empty() {
            continue;
        }
        let statements =
            attempt(parser, candidate, dialect).or_else(|| attempt(parser, &repair(candidate), dialect));
        if let Some(statements) = statements {
            return Some(outcome(statements, ParseStrategy::Truncated));
        }
    }

    None
}

fn outcome(statements: Vec<Statement>, strategy: ParseStrategy) -> ParseOutcome {
    #[cfg(feature = "tracing")]
    debug!(?strategy, statements = statements.len(), "fragment parsed");

    ParseOutcome {
        statements,
        strategy,
    }
}

fn attempt<P>(parser: &P, sql: &str, dialect: Dialect) -> Option<Vec<Statement>>
where
    P: FragmentParser + ?Sized,
{
    match parser.parse(sql, dialect) {
        Ok(statements) if !statements.is_empty() => Some(statements),
        Ok(_) => None,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            trace!(error = %_err, "fragment parse attempt failed");
            None
        }
    }
}

/// Applies every minimal repair that matches.
pub(crate) fn repair(sql: &str) -> String {
    let mut fixed = close_unclosed_string(sql);
    fixed = replace_outside_literals(&fixed, &DANGLING_QUALIFIER_RE, "NULL${1}");
    fixed = replace_outside_literals(&fixed, &EMPTY_PROJECTION_RE, "${1} 1${2}");
    fixed = replace_outside_literals(&fixed, &COMMA_BEFORE_FROM_RE, "${1}");
    fixed = strip_trailing_comma(&fixed);
    close_unclosed_parens(&fixed)
}

/// Replaces matches of `regex` found in the masked text, splicing the
/// expansion into the original. `${N}` groups expand to the original text
/// at the group's range, so masked comments and literals survive intact.
fn replace_outside_literals(sql: &str, regex: &Regex, replacement: &str) -> String {
    let masked = mask_sql(sql);
    let mut out = String::with_capacity(sql.len() + 8);
    let mut last = 0;
    for caps in regex.captures_iter(&masked) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&sql[last..whole.start()]);
        expand_from_original(replacement, &caps, sql, &mut out);
        last = whole.end();
    }
    out.push_str(&sql[last..]);
    out
}

/// Expands `${N}` references in `template` with text taken from `sql`.
fn expand_from_original(template: &str, caps: &Captures<'_>, sql: &str, out: &mut String) {
    let mut rest = template;
    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return;
        };
        if let Some(group) = after[..close].parse::<usize>().ok().and_then(|i| caps.get(i)) {
            out.push_str(sql.get(group.range()).unwrap_or(group.as_str()));
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
}

fn close_unclosed_string(sql: &str) -> String {
    let single_quotes = sql.chars().filter(|&c| c == '\'').count();
    if single_quotes % 2 != 0 {
        return format!("{sql}'");
    }
    let double_quotes = sql.chars().filter(|&c| c == '"').count();
    if double_quotes % 2 != 0 {
        return format!("{sql}\"");
    }
    sql.to_string()
}

fn strip_trailing_comma(sql: &str) -> String {
    let trimmed = sql.trim_end();
    match trimmed.strip_suffix(',') {
        Some(without) => without.to_string(),
        None => sql.to_string(),
    }
}

fn close_unclosed_parens(sql: &str) -> String {
    let masked = mask_sql(sql);
    let open = masked.chars().filter(|&c| c == '(').count();
    let close = masked.chars().filter(|&c| c == ')').count();
    if open <= close || open - close > MAX_PAREN_FIXES {
        return sql.to_string();
    }
    format!("{sql}{}", ")".repeat(open - close))
}

/// Byte offsets just before clause keywords, latest first.
fn truncation_points(sql: &str) -> Vec<usize> {
    let masked = mask_sql(sql);
    let mut points: Vec<usize> = TRUNCATION_KEYWORD_RE
        .find_iter(&masked)
        .map(|m| m.start())
        .filter(|&start| start > 0)
        .collect();
    points.reverse();
    points
}
