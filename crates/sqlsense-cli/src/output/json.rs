//! JSON output formatting.

use super::Report;

/// Format a report as JSON.
pub fn format_json(report: &Report, compact: bool) -> String {
    if compact {
        serde_json::to_string(report).unwrap_or_else(|e| format!(r#"{{"error": "{e}"}}"#))
    } else {
        serde_json::to_string_pretty(report).unwrap_or_else(|e| format!(r#"{{"error": "{e}"}}"#))
    }
}
