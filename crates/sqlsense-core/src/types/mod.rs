//! Types for the completion API.
//!
//! Everything here is plain data with serde and JSON-schema support so the same
//! values can cross the wasm boundary or be printed by the CLI unchanged.

mod assist;
mod catalog;
mod common;
mod config;

pub use assist::{
    ClauseContext, CompletionContext, Completions, CursorToken, DerivedRelation, DmlContext,
    DmlVerb, Documentation, DocumentationKind, Scope, ScopeEntry, StatementKind, StatementSpan,
    Suggestion, SuggestionKind,
};
pub use catalog::{
    Catalog, Column, Database, ForeignKey, Function, Index, Parameter, Procedure, Table,
    Trigger, View,
};
pub use common::{Dialect, Position, Range};
pub use config::AssistConfig;
