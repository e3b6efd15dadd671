//! Configuration for the completion engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Dialect;

/// Settings shared by every request of an editing session.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistConfig {
    /// Dialect handed to the fragment parser and used to filter functions.
    #[serde(default)]
    pub dialect: Dialect,

    /// Replaces the built-in global keyword list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Offer the built-in function table ahead of the catalog's functions (default: true).
    #[serde(default = "default_builtin_functions")]
    pub builtin_functions: bool,

    /// Upper bound on the number of suggestions returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            keywords: None,
            builtin_functions: true,
            max_items: None,
        }
    }
}

fn default_builtin_functions() -> bool {
    true
}

impl AssistConfig {
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}
