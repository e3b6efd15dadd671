pub mod assistant;
pub mod buffer;
pub mod catalog;
pub mod classifier;
pub mod completion;
pub mod error;
pub mod hover;
mod mask;
pub mod parser;
pub mod scope;
pub mod segmenter;
pub mod types;

// Re-export main types and functions
pub use assistant::SqlAssistant;
pub use buffer::{BufferSnapshot, TextBuffer};
pub use catalog::{CatalogIndex, TableColumn};
pub use classifier::{classify, detect_dml, latest_clause};
pub use completion::{builtin_functions, Compositor};
pub use error::{CatalogError, ParseError};
pub use hover::HoverResolver;
pub use parser::{parse_sql_with_dialect, FragmentParser, SqlparserParser};
pub use scope::resolve_scope;
pub use segmenter::{statement_span, statement_starts};

// Re-export types explicitly
pub use types::{
    AssistConfig,
    Catalog,
    ClauseContext,
    Column,
    CompletionContext,
    Completions,
    CursorToken,
    Database,
    DerivedRelation,
    Dialect,
    DmlContext,
    DmlVerb,
    Documentation,
    DocumentationKind,
    ForeignKey,
    Function,
    Index,
    Parameter,
    Position,
    Procedure,
    Range,
    Scope,
    ScopeEntry,
    StatementKind,
    StatementSpan,
    Suggestion,
    SuggestionKind,
    Table,
    Trigger,
    View,
};
