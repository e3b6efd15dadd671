//! Clause classification from the text between a statement's start and the cursor.
//!
//! Classification is a heuristic over keyword positions, not a parse: the
//! clause whose keyword occurs last wins. Keywords match case-insensitively as
//! whole words over masked text, so `order_by_date` or `'WHERE'` never count.

use std::sync::LazyLock;

use regex::Regex;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::mask::mask_sql;
use crate::types::{ClauseContext, DmlContext, DmlVerb};

/// A clause-opening keyword the classifier looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKeyword {
    Select,
    From,
    Join,
    On,
    Where,
    GroupBy,
    Having,
    OrderBy,
}

/// Trailing clauses in SQL order; later entries win ties.
const TRAILING_CLAUSES: [(ClauseKeyword, ClauseContext); 4] = [
    (ClauseKeyword::Where, ClauseContext::Where),
    (ClauseKeyword::GroupBy, ClauseContext::GroupBy),
    (ClauseKeyword::Having, ClauseContext::Having),
    (ClauseKeyword::OrderBy, ClauseContext::OrderBy),
];

fn keyword_regex(pattern: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{pattern}\b")).expect("Invalid regex pattern")
}

static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("SELECT"));
static FROM_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("FROM"));
static JOIN_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("JOIN"));
static ON_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("ON"));
static WHERE_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("WHERE"));
static GROUP_BY_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(r"GROUP\s+BY"));
static HAVING_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("HAVING"));
static ORDER_BY_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(r"ORDER\s+BY"));

static SET_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("SET"));
static INSERT_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("INSERT"));
static UPDATE_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("UPDATE"));
static DELETE_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex("DELETE"));

// A target table counts only once the name is followed by whitespace (or `(`
// for INSERT), i.e. the user has finished typing it.
static INSERT_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bINSERT\s+INTO\s+([\w$.]+)[\s(]").expect("Invalid regex pattern")
});
static UPDATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bUPDATE\s+([\w$.]+)\s").expect("Invalid regex pattern")
});
static DELETE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bDELETE\s+FROM\s+([\w$.]+)\s").expect("Invalid regex pattern")
});

impl ClauseKeyword {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Select => &SELECT_RE,
            Self::From => &FROM_RE,
            Self::Join => &JOIN_RE,
            Self::On => &ON_RE,
            Self::Where => &WHERE_RE,
            Self::GroupBy => &GROUP_BY_RE,
            Self::Having => &HAVING_RE,
            Self::OrderBy => &ORDER_BY_RE,
        }
    }
}

/// Byte index of the last whole-word occurrence of `keyword` in `text`.
///
/// `text` is matched as given; callers mask literals and comments first.
pub fn last_keyword_index(text: &str, keyword: ClauseKeyword) -> Option<usize> {
    last_match(keyword.regex(), text)
}

fn last_match(regex: &Regex, text: &str) -> Option<usize> {
    regex.find_iter(text).last().map(|m| m.start())
}

/// The trailing clause (`WHERE`, `GROUP BY`, `HAVING`, `ORDER BY`) whose
/// keyword occurs last in `text`.
///
/// When two keywords share an index the one later in SQL clause order wins.
pub fn latest_clause(text: &str) -> Option<ClauseContext> {
    let mut best: Option<(usize, ClauseContext)> = None;
    for (keyword, clause) in TRAILING_CLAUSES {
        if let Some(index) = last_keyword_index(text, keyword) {
            if best.map_or(true, |(best_index, _)| index >= best_index) {
                best = Some((index, clause));
            }
        }
    }
    best.map(|(_, clause)| clause)
}

/// Classifies the clause the end of `prefix` sits in.
pub fn classify(prefix: &str) -> ClauseContext {
    let masked = mask_sql(prefix);
    let clause = classify_masked(&masked);

    #[cfg(feature = "tracing")]
    debug!(?clause, "classified prefix");

    clause
}

fn classify_masked(text: &str) -> ClauseContext {
    if last_keyword_index(text, ClauseKeyword::Select).is_none() {
        return ClauseContext::None;
    }
    if last_keyword_index(text, ClauseKeyword::From).is_none() {
        return ClauseContext::Select;
    }
    if let Some(clause) = latest_clause(text) {
        return clause;
    }
    match last_keyword_index(text, ClauseKeyword::Join) {
        Some(join) => match last_keyword_index(text, ClauseKeyword::On) {
            Some(on) if on > join => ClauseContext::On,
            _ => ClauseContext::Join,
        },
        None => ClauseContext::From,
    }
}

/// Detects an `INSERT`, `UPDATE` or `DELETE` statement in a prefix.
///
/// The most recent verb wins. Only meaningful when [`classify`] returned
/// [`ClauseContext::None`].
pub fn detect_dml(prefix: &str) -> Option<DmlContext> {
    let masked = mask_sql(prefix);

    let (verb, verb_index) = [
        (DmlVerb::Insert, &*INSERT_RE),
        (DmlVerb::Update, &*UPDATE_RE),
        (DmlVerb::Delete, &*DELETE_RE),
    ]
    .into_iter()
    .filter_map(|(verb, regex)| last_match(regex, &masked).map(|index| (verb, index)))
    .max_by_key(|(_, index)| *index)?;

    let table_regex: &Regex = match verb {
        DmlVerb::Insert => &INSERT_TABLE_RE,
        DmlVerb::Update => &UPDATE_TABLE_RE,
        DmlVerb::Delete => &DELETE_TABLE_RE,
    };
    let table = table_regex
        .captures_iter(&masked)
        .filter_map(|caps| caps.get(1))
        .filter(|m| m.start() > verb_index)
        .last()
        .map(|m| prefix[m.range()].to_string());

    Some(DmlContext {
        verb,
        table,
        has_from: FROM_RE.is_match(&masked),
        has_set: SET_RE.is_match(&masked),
        has_where: WHERE_RE.is_match(&masked),
    })
}
