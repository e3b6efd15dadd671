//! Turns clause, scope and catalog into a ranked suggestion list.
//!
//! Every branch emits candidates in rank order; `sort_rank` is the position in
//! the final list after partial-token filtering. Duplicate `(kind, label)`
//! pairs keep their first, higher-ranked occurrence.

use std::collections::HashSet;

use crate::catalog::{CatalogIndex, TableColumn};
use crate::types::{
    AssistConfig, ClauseContext, CompletionContext, DmlContext, DmlVerb, Scope, Suggestion,
    SuggestionKind,
};

use super::functions::function_suggestion;
use super::keywords::{
    keyword_suggestion, select_snippet, JOIN_KEYWORDS, ORDER_KEYWORDS, PREDICATE_KEYWORDS,
    SQL_KEYWORDS,
};

/// How many `*` projections are followed when expanding CTE columns.
const MAX_WILDCARD_DEPTH: usize = 8;

/// A column a relation exposes, with display details.
#[derive(Debug, Clone)]
struct RelationColumn {
    name: String,
    detail: String,
    documentation: Option<String>,
}

/// Suggestion composer for one catalog and configuration.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'a> {
    index: &'a CatalogIndex,
    config: &'a AssistConfig,
}

impl<'a> Compositor<'a> {
    pub fn new(index: &'a CatalogIndex, config: &'a AssistConfig) -> Self {
        Self { index, config }
    }

    /// Ranked candidates for `context`. Never fails; unknown names yield fewer items.
    pub fn suggest(&self, context: &CompletionContext) -> Vec<Suggestion> {
        let mut list = SuggestionList::default();

        if context.token.after_dot {
            // Nothing usable before the dot means nothing to offer.
            if let Some(qualifier) = &context.token.qualifier {
                self.qualified_columns(&mut list, &context.scope, qualifier);
            }
        } else {
            match context.clause {
                ClauseContext::Select => self.select_clause(&mut list, &context.scope),
                ClauseContext::From | ClauseContext::Join => {
                    self.relation_clause(&mut list, context.clause)
                }
                ClauseContext::On
                | ClauseContext::Where
                | ClauseContext::GroupBy
                | ClauseContext::Having
                | ClauseContext::OrderBy => {
                    self.filter_clause(&mut list, context.clause, &context.scope)
                }
                ClauseContext::None => match &context.dml {
                    Some(dml) => self.dml(&mut list, dml),
                    None => self.global(&mut list),
                },
            }
        }

        list.finish(&context.token.partial, self.config.max_items)
    }

    /// `alias.` path: only the columns of the relation behind the qualifier.
    fn qualified_columns(&self, list: &mut SuggestionList, scope: &Scope, qualifier: &str) {
        let table = scope.resolve(qualifier).unwrap_or(qualifier);
        for column in self.relation_columns(scope, table, 0) {
            list.column(column.name.clone(), &column);
        }
    }

    fn select_clause(&self, list: &mut SuggestionList, scope: &Scope) {
        for entry in &scope.entries {
            list.push(Suggestion {
                detail: Some(entry.table.clone()),
                ..plain(SuggestionKind::Variable, &entry.alias)
            });
        }
        self.scoped_columns(list, scope);
        for column in self.catalog_columns() {
            list.column(column.name.clone(), &column);
        }
        self.functions(list);
        list.keyword("FROM");
    }

    fn relation_clause(&self, list: &mut SuggestionList, clause: ClauseContext) {
        self.tables(list);
        self.views(list);
        if clause != ClauseContext::From {
            list.keyword("ON");
        }
        list.keywords(JOIN_KEYWORDS);
        list.keywords(&["WHERE", "ORDER BY"]);
    }

    fn filter_clause(&self, list: &mut SuggestionList, clause: ClauseContext, scope: &Scope) {
        for entry in &scope.entries {
            list.push(Suggestion {
                detail: Some("table".to_string()),
                ..plain(SuggestionKind::Table, &entry.table)
            });
            if !entry.alias.eq_ignore_ascii_case(&entry.table) {
                list.push(Suggestion {
                    detail: Some(entry.table.clone()),
                    ..plain(SuggestionKind::Variable, &entry.alias)
                });
            }
            for column in self.relation_columns(scope, &entry.table, 0) {
                list.column(format!("{}.{}", entry.alias, column.name), &column);
            }
        }

        match clause {
            ClauseContext::On => {
                list.keywords(JOIN_KEYWORDS);
                list.keywords(PREDICATE_KEYWORDS);
            }
            ClauseContext::Where => {
                list.keywords(PREDICATE_KEYWORDS);
                list.keywords(&["GROUP BY", "ORDER BY"]);
            }
            ClauseContext::GroupBy => list.keywords(&["HAVING", "ORDER BY"]),
            ClauseContext::Having => {
                self.functions(list);
                list.keywords(PREDICATE_KEYWORDS);
            }
            ClauseContext::OrderBy => list.keywords(ORDER_KEYWORDS),
            _ => {}
        }
    }

    fn dml(&self, list: &mut SuggestionList, dml: &DmlContext) {
        match (dml.verb, &dml.table) {
            (DmlVerb::Insert, Some(table)) => self.table_columns(list, table),
            (DmlVerb::Insert, None) => {
                for (table, columns) in self.index.tables_with_columns() {
                    let columns: Vec<&str> =
                        columns.iter().map(|c| c.column.name.as_str()).collect();
                    list.push(Suggestion {
                        insert_text: format!("{}({}) VALUES ()", table.name, columns.join(", ")),
                        detail: Some("insert".to_string()),
                        documentation: table.comment.clone(),
                        ..plain(SuggestionKind::Snippet, &table.name)
                    });
                }
            }
            (DmlVerb::Update, Some(table)) => {
                self.table_columns(list, table);
                if !dml.has_set {
                    list.keyword("SET");
                }
                if !dml.has_where {
                    list.keyword("WHERE");
                }
            }
            (DmlVerb::Update, None) => self.tables(list),
            (DmlVerb::Delete, Some(table)) => {
                self.table_columns(list, table);
                if !dml.has_where {
                    list.keyword("WHERE");
                }
            }
            (DmlVerb::Delete, None) => {
                if !dml.has_from {
                    list.keyword("FROM");
                }
                self.tables(list);
            }
        }
    }

    fn global(&self, list: &mut SuggestionList) {
        match &self.config.keywords {
            Some(keywords) => {
                for keyword in keywords {
                    list.keyword(keyword);
                }
            }
            None => list.keywords(SQL_KEYWORDS),
        }
        list.push(select_snippet());
        self.tables(list);
        self.views(list);
        self.functions(list);
        for column in self.catalog_columns() {
            list.column(column.name.clone(), &column);
        }
    }

    fn tables(&self, list: &mut SuggestionList) {
        for table in self.index.tables() {
            list.push(Suggestion {
                detail: Some("table".to_string()),
                documentation: table.comment.clone(),
                ..plain(SuggestionKind::Table, &table.name)
            });
        }
    }

    fn views(&self, list: &mut SuggestionList) {
        for view in self.index.views() {
            list.push(Suggestion {
                detail: Some("view".to_string()),
                documentation: view.comment.clone(),
                ..plain(SuggestionKind::Table, &view.name)
            });
        }
    }

    fn functions(&self, list: &mut SuggestionList) {
        for function in self.index.functions() {
            if function.is_supported_by(self.config.dialect) {
                list.push(function_suggestion(function));
            }
        }
    }

    /// `alias.column` for every scope entry.
    fn scoped_columns(&self, list: &mut SuggestionList, scope: &Scope) {
        for entry in &scope.entries {
            for column in self.relation_columns(scope, &entry.table, 0) {
                list.column(format!("{}.{}", entry.alias, column.name), &column);
            }
        }
    }

    /// Unqualified catalog columns of a single table.
    fn table_columns(&self, list: &mut SuggestionList, table: &str) {
        for column in self.catalog_table_columns(table) {
            list.column(column.name.clone(), &column);
        }
    }

    /// Columns of a CTE or derived table when `table` names one, else of the
    /// catalog table.
    fn relation_columns(&self, scope: &Scope, table: &str, depth: usize) -> Vec<RelationColumn> {
        let Some(relation) = scope.derived_relation(table) else {
            return self.catalog_table_columns(table);
        };

        let mut columns: Vec<RelationColumn> = relation
            .columns
            .iter()
            .map(|name| RelationColumn {
                name: name.clone(),
                detail: relation.name.clone(),
                documentation: None,
            })
            .collect();

        if depth < MAX_WILDCARD_DEPTH {
            for source in &relation.wildcard_tables {
                // A CTE selecting `*` from itself resolves to the catalog table.
                let expanded = if source.eq_ignore_ascii_case(&relation.name) {
                    self.catalog_table_columns(source)
                } else {
                    self.relation_columns(scope, source, depth + 1)
                };
                columns.extend(expanded);
            }
        }

        columns
    }

    fn catalog_table_columns(&self, table: &str) -> Vec<RelationColumn> {
        self.index.columns(table).iter().map(catalog_column).collect()
    }

    /// Every column of every table, including same-named tables of other schemas.
    fn catalog_columns(&self) -> Vec<RelationColumn> {
        self.index.all_columns().map(catalog_column).collect()
    }
}

fn catalog_column(tc: &TableColumn) -> RelationColumn {
    RelationColumn {
        name: tc.column.name.clone(),
        detail: match &tc.column.data_type {
            Some(data_type) => format!("{}: {}", tc.table, data_type),
            None => tc.table.clone(),
        },
        documentation: tc.column.comment.clone(),
    }
}

fn plain(kind: SuggestionKind, label: &str) -> Suggestion {
    Suggestion {
        label: label.to_string(),
        kind,
        insert_text: label.to_string(),
        detail: None,
        documentation: None,
        sort_rank: 0,
    }
}

/// Ordered, de-duplicated suggestions under construction.
#[derive(Default)]
struct SuggestionList {
    items: Vec<Suggestion>,
    seen: HashSet<(SuggestionKind, String)>,
}

impl SuggestionList {
    fn push(&mut self, suggestion: Suggestion) {
        if self.seen.insert((suggestion.kind, suggestion.label.clone())) {
            self.items.push(suggestion);
        }
    }

    fn keyword(&mut self, keyword: &str) {
        self.push(keyword_suggestion(keyword));
    }

    fn keywords(&mut self, keywords: &[&str]) {
        for keyword in keywords {
            self.keyword(keyword);
        }
    }

    fn column(&mut self, label: String, column: &RelationColumn) {
        self.push(Suggestion {
            insert_text: label.clone(),
            label,
            kind: SuggestionKind::Column,
            detail: Some(column.detail.clone()),
            documentation: column.documentation.clone(),
            sort_rank: 0,
        });
    }

    /// Filters by the partial token, ranks, and applies the item cap.
    fn finish(self, partial: &str, max_items: Option<usize>) -> Vec<Suggestion> {
        let partial = partial.to_lowercase();
        let mut items: Vec<Suggestion> = self
            .items
            .into_iter()
            .filter(|item| matches_partial(&item.label, &partial))
            .collect();

        if let Some(max) = max_items {
            items.truncate(max);
        }
        for (rank, item) in items.iter_mut().enumerate() {
            item.sort_rank = rank as u32;
        }
        items
    }
}

/// Case-insensitive prefix match on the label or on the part after its last `.`.
fn matches_partial(label: &str, partial_lower: &str) -> bool {
    if partial_lower.is_empty() {
        return true;
    }
    let label = label.to_lowercase();
    if label.starts_with(partial_lower) {
        return true;
    }
    label
        .rsplit_once('.')
        .is_some_and(|(_, column)| column.starts_with(partial_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Catalog, Column, CursorToken, Database, Position, Range, StatementSpan, Table};

    fn catalog() -> Catalog {
        let table = |name: &str, columns: &[&str]| Table {
            name: name.to_string(),
            columns: columns
                .iter()
                .zip(1..)
                .map(|(column, order)| Column::new(*column, order))
                .collect(),
            ..Default::default()
        };
        Catalog {
            databases: vec![Database {
                tables: vec![table("users", &["id", "name"]), table("roles", &["id", "title"])],
                ..Default::default()
            }],
        }
    }

    fn context(clause: ClauseContext, scope: Scope, token: CursorToken) -> CompletionContext {
        CompletionContext {
            span: StatementSpan::new(1, 1),
            clause,
            dml: None,
            scope,
            token,
            replace_range: Range::new(Position::new(1, 1), Position::new(1, 1)),
        }
    }

    fn labels(items: &[Suggestion]) -> Vec<&str> {
        items.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn test_matches_partial() {
        assert!(matches_partial("users.name", "na"));
        assert!(matches_partial("users.name", "us"));
        assert!(matches_partial("GROUP BY", "gr"));
        assert!(!matches_partial("roles", "us"));
        assert!(matches_partial("anything", ""));
    }

    #[test]
    fn test_qualified_partial_filters_columns() {
        let index = CatalogIndex::new(&catalog());
        let config = AssistConfig::default();
        let compositor = Compositor::new(&index, &config);

        let mut scope = Scope::empty();
        scope.insert("u", "users");
        let token = CursorToken {
            partial: "na".to_string(),
            qualifier: Some("u".to_string()),
            after_dot: true,
        };
        let items = compositor.suggest(&context(ClauseContext::Select, scope, token));
        assert_eq!(labels(&items), vec!["name"]);
        assert_eq!(items[0].sort_rank, 0);
    }

    #[test]
    fn test_dot_without_qualifier_offers_nothing() {
        let index = CatalogIndex::new(&catalog());
        let config = AssistConfig::default();
        let compositor = Compositor::new(&index, &config);

        let token = CursorToken {
            partial: String::new(),
            qualifier: None,
            after_dot: true,
        };
        let items = compositor.suggest(&context(ClauseContext::Select, Scope::empty(), token));
        assert!(items.is_empty());
    }

    #[test]
    fn test_select_dedupes_catalog_columns() {
        let index = CatalogIndex::new(&catalog());
        let config = AssistConfig {
            builtin_functions: false,
            ..AssistConfig::default()
        };
        let compositor = Compositor::new(&index, &config);

        let items = compositor.suggest(&context(
            ClauseContext::Select,
            Scope::empty(),
            CursorToken::default(),
        ));
        assert_eq!(labels(&items), vec!["id", "name", "title", "FROM"]);
    }

    #[test]
    fn test_max_items_caps_after_ranking() {
        let index = CatalogIndex::new(&catalog());
        let config = AssistConfig {
            max_items: Some(2),
            ..AssistConfig::default()
        };
        let compositor = Compositor::new(&index, &config);

        let items = compositor.suggest(&context(
            ClauseContext::From,
            Scope::empty(),
            CursorToken::default(),
        ));
        assert_eq!(labels(&items), vec!["users", "roles"]);
        assert_eq!(items[1].sort_rank, 1);
    }
}
