//! Suggestion composition.
//!
//! [`Compositor`] turns a [`crate::types::CompletionContext`] into a ranked
//! list of [`crate::types::Suggestion`]s using the catalog index, the built-in
//! function table and the keyword lists below.

mod compose;
mod functions;
mod keywords;

pub use compose::Compositor;
pub use functions::builtin_functions;
pub use keywords::{
    JOIN_KEYWORDS, ORDER_KEYWORDS, PREDICATE_KEYWORDS, SELECT_SNIPPET_LABEL, SQL_KEYWORDS,
};
