//! Table scope of the active statement, taken from a best-effort parse.
//!
//! Entries of the statement's own `FROM`/`JOIN` list come first; tables that
//! only appear inside subqueries and CTE bodies follow, so an alias typed
//! inside a nested query still resolves. CTEs and aliased derived tables are
//! also recorded as [`DerivedRelation`]s with the columns they project.

use sqlparser::ast::{
    Cte, Expr, FromTable, ObjectName, Query, Select, SelectItem, SelectItemQualifiedWildcardKind,
    SetExpr, Statement, TableAlias, TableFactor, TableWithJoins, UpdateTableFromKind,
};
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::parser::repair::parse_best_effort;
use crate::parser::FragmentParser;
use crate::types::{DerivedRelation, Dialect, Scope, StatementKind};

/// Maximum nesting the walker follows; deeper subqueries are ignored.
const MAX_SCOPE_DEPTH: usize = 50;

/// Parses `statement_sql` best-effort and extracts its scope.
///
/// Never fails: an unparseable fragment yields [`Scope::empty`].
pub fn resolve_scope<P>(parser: &P, statement_sql: &str, dialect: Dialect) -> Scope
where
    P: FragmentParser + ?Sized,
{
    let scope = match parse_best_effort(parser, statement_sql, dialect) {
        Some(outcome) => scope_from_statements(&outcome.statements),
        None => Scope::empty(),
    };

    #[cfg(feature = "tracing")]
    debug!(
        kind = ?scope.kind,
        entries = scope.entries.len(),
        derived = scope.derived.len(),
        "resolved scope"
    );

    scope
}

/// Extracts the scope of the first statement in `statements`.
pub fn scope_from_statements(statements: &[Statement]) -> Scope {
    let Some(statement) = statements.first() else {
        return Scope::empty();
    };

    let mut collector = ScopeCollector::default();
    let kind = collector.statement(statement);
    collector.finish(kind)
}

#[derive(Default)]
struct ScopeCollector {
    top_level: Vec<(String, String)>,
    nested: Vec<(String, String)>,
    derived: Vec<DerivedRelation>,
}

impl ScopeCollector {
    fn finish(self, kind: StatementKind) -> Scope {
        let mut scope = Scope {
            kind,
            ..Scope::default()
        };
        for (alias, table) in self.top_level.into_iter().chain(self.nested) {
            scope.insert(alias, table);
        }
        for relation in self.derived {
            if scope.derived_relation(&relation.name).is_none() {
                scope.derived.push(relation);
            }
        }
        scope
    }

    fn push(&mut self, depth: usize, alias: String, table: String) {
        if depth == 0 {
            self.top_level.push((alias, table));
        } else {
            self.nested.push((alias, table));
        }
    }

    fn statement(&mut self, statement: &Statement) -> StatementKind {
        match statement {
            Statement::Query(query) => {
                self.query(query, 0);
                StatementKind::Select
            }
            Statement::Insert(insert) => {
                if let Some(source) = &insert.source {
                    self.query(source, 0);
                }
                StatementKind::Insert
            }
            Statement::Update { table, from, .. } => {
                self.table_with_joins(table, 0);
                if let Some(UpdateTableFromKind::BeforeSet(tables))
                | Some(UpdateTableFromKind::AfterSet(tables)) = from
                {
                    for table in tables {
                        self.table_with_joins(table, 0);
                    }
                }
                StatementKind::Update
            }
            Statement::Delete(delete) => {
                let tables = match &delete.from {
                    FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
                        tables
                    }
                };
                for table in tables.iter().chain(delete.using.iter().flatten()) {
                    self.table_with_joins(table, 0);
                }
                StatementKind::Delete
            }
            _ => StatementKind::Other,
        }
    }

    fn query(&mut self, query: &Query, depth: usize) {
        if depth > MAX_SCOPE_DEPTH {
            return;
        }

        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.derived.push(cte_relation(cte));
                self.query(&cte.query, depth + 1);
            }
        }

        self.set_expr(&query.body, depth);
    }

    fn set_expr(&mut self, set_expr: &SetExpr, depth: usize) {
        if depth > MAX_SCOPE_DEPTH {
            return;
        }

        match set_expr {
            SetExpr::Select(select) => self.select(select, depth),
            SetExpr::Query(query) => self.query(query, depth),
            SetExpr::SetOperation { left, right, .. } => {
                self.set_expr(left, depth);
                self.set_expr(right, depth);
            }
            _ => {}
        }
    }

    fn select(&mut self, select: &Select, depth: usize) {
        for table_with_joins in &select.from {
            self.table_with_joins(table_with_joins, depth);
        }
    }

    fn table_with_joins(&mut self, table_with_joins: &TableWithJoins, depth: usize) {
        self.table_factor(&table_with_joins.relation, depth);
        for join in &table_with_joins.joins {
            self.table_factor(&join.relation, depth);
        }
    }

    fn table_factor(&mut self, factor: &TableFactor, depth: usize) {
        if depth > MAX_SCOPE_DEPTH {
            return;
        }

        match factor {
            TableFactor::Table { name, alias, .. } => {
                let table = object_name_string(name);
                let alias = match alias {
                    Some(alias) => alias.name.value.clone(),
                    None => last_name_part(name),
                };
                self.push(depth, alias, table);
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                if let Some(alias) = alias {
                    let name = alias.name.value.clone();
                    self.derived.push(derived_relation(&name, alias, subquery));
                    self.push(depth, name.clone(), name);
                }
                self.query(subquery, depth + 1);
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.table_with_joins(table_with_joins, depth),
            _ => {}
        }
    }
}

fn cte_relation(cte: &Cte) -> DerivedRelation {
    derived_relation(&cte.alias.name.value, &cte.alias, &cte.query)
}

/// Columns a CTE or derived table exposes. Declared alias columns take
/// precedence over the projection.
fn derived_relation(name: &str, alias: &TableAlias, query: &Query) -> DerivedRelation {
    let mut relation = DerivedRelation {
        name: name.to_string(),
        ..DerivedRelation::default()
    };

    if !alias.columns.is_empty() {
        relation.columns = alias
            .columns
            .iter()
            .map(|column| column.name.value.clone())
            .collect();
        return relation;
    }

    if let Some(select) = first_select(&query.body) {
        project_select(select, &mut relation);
    }
    relation
}

/// The select that names a query's columns; the left branch of a set operation.
fn first_select(set_expr: &SetExpr) -> Option<&Select> {
    match set_expr {
        SetExpr::Select(select) => Some(select),
        SetExpr::Query(query) => first_select(&query.body),
        SetExpr::SetOperation { left, .. } => first_select(left),
        _ => None,
    }
}

fn project_select(select: &Select, relation: &mut DerivedRelation) {
    let sources = select_sources(select);

    for item in &select.projection {
        match item {
            SelectItem::ExprWithAlias { alias, .. } => relation.columns.push(alias.value.clone()),
            SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                relation.columns.push(ident.value.clone())
            }
            SelectItem::UnnamedExpr(Expr::CompoundIdentifier(parts)) => {
                if let Some(last) = parts.last() {
                    relation.columns.push(last.value.clone());
                }
            }
            SelectItem::Wildcard(_) => {
                for (_, table) in &sources {
                    push_unique(&mut relation.wildcard_tables, table);
                }
            }
            SelectItem::QualifiedWildcard(SelectItemQualifiedWildcardKind::ObjectName(name), _) => {
                let qualifier = last_name_part(name);
                if let Some((_, table)) = sources
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(&qualifier))
                {
                    push_unique(&mut relation.wildcard_tables, table);
                }
            }
            _ => {}
        }
    }
}

/// Alias and relation name of every entry in a select's own `FROM` list.
fn select_sources(select: &Select) -> Vec<(String, String)> {
    let mut collector = ScopeCollector::default();
    collector.select(select, 0);
    collector.top_level
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing.eq_ignore_ascii_case(name)) {
        names.push(name.to_string());
    }
}

/// Dotted name built from identifier values, without quoting.
fn object_name_string(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|part| match part.as_ident() {
            Some(ident) => ident.value.clone(),
            None => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn last_name_part(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|part| match part.as_ident() {
            Some(ident) => ident.value.clone(),
            None => part.to_string(),
        })
        .unwrap_or_default()
}
