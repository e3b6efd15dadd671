//! Output formatting modules.

pub mod json;
pub mod table;

pub use json::format_json;
pub use table::format_table;

use serde::Serialize;
use sqlsense_core::{Documentation, Range, StatementSpan, Suggestion};

/// Result of one lookup, ready to be rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Report {
    #[serde(rename_all = "camelCase")]
    Complete {
        items: Vec<Suggestion>,
        replace_range: Range,
    },
    Hover {
        documentation: Option<Documentation>,
    },
    Span {
        span: StatementSpan,
    },
    Starts {
        starts: Vec<usize>,
    },
}

impl Report {
    /// True when the lookup found nothing worth showing.
    pub fn is_empty(&self) -> bool {
        match self {
            Report::Complete { items, .. } => items.is_empty(),
            Report::Hover { documentation } => documentation.is_none(),
            Report::Span { .. } => false,
            Report::Starts { starts } => starts.is_empty(),
        }
    }
}
