//! Hover documentation for the word under the pointer.
//!
//! Functions are documented only inside a `SELECT` list; tables and views
//! anywhere. An in-scope alias shows the documentation of the relation it
//! stands for. Contents are Markdown.

use std::fmt::Write;

use crate::catalog::CatalogIndex;
use crate::classifier::classify;
use crate::types::{
    ClauseContext, Documentation, DocumentationKind, Function, Range, Scope, Table, View,
};

/// Resolves hover documentation against a catalog index.
#[derive(Debug, Clone, Copy)]
pub struct HoverResolver<'a> {
    index: &'a CatalogIndex,
}

impl<'a> HoverResolver<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self { index }
    }

    /// Documentation for `word`, given the statement text up to the pointer.
    ///
    /// `scope` is only evaluated when `word` names neither a function nor a
    /// relation, so the fragment parse is skipped for direct hits.
    pub fn resolve<F>(&self, word: &str, prefix: &str, range: Range, scope: F) -> Option<Documentation>
    where
        F: FnOnce() -> Scope,
    {
        if word.is_empty() {
            return None;
        }

        if classify(prefix) == ClauseContext::Select {
            if let Some(function) = self.index.function(word) {
                return Some(function_documentation(function, range));
            }
        }

        if let Some(doc) = self.relation(word, range) {
            return Some(doc);
        }

        let scope = scope();
        let table = scope.resolve(word)?;
        self.relation(table, range)
    }

    fn relation(&self, name: &str, range: Range) -> Option<Documentation> {
        if let Some(table) = self.index.table(name) {
            return Some(table_documentation(table, range));
        }
        self.index
            .view(name)
            .map(|view| view_documentation(view, range))
    }
}

fn table_documentation(table: &Table, range: Range) -> Documentation {
    let mut out = String::new();
    writeln!(out, "### {}", table.name).unwrap();

    if let Some(comment) = non_empty(&table.comment) {
        writeln!(out).unwrap();
        writeln!(out, "{comment}").unwrap();
    }

    if !table.columns.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "| Column | Type | Nullable | Default | Comment |").unwrap();
        writeln!(out, "| --- | --- | --- | --- | --- |").unwrap();
        let mut columns: Vec<_> = table.columns.iter().collect();
        columns.sort_by_key(|column| column.order);
        for column in columns {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                cell(&column.name),
                cell(column.data_type.as_deref().unwrap_or("")),
                if column.nullable { "YES" } else { "NO" },
                cell(column.default_value.as_deref().unwrap_or("")),
                cell(column.comment.as_deref().unwrap_or("")),
            )
            .unwrap();
        }
    }

    if !table.indexes.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "**Indexes**").unwrap();
        writeln!(out).unwrap();
        let mut indexes: Vec<_> = table.indexes.iter().collect();
        indexes.sort_by_key(|index| index.order);
        for index in indexes {
            let unique = if index.unique { " (unique)" } else { "" };
            writeln!(out, "- `{}`{}: {}", index.name, unique, index.columns.join(", ")).unwrap();
        }
    }

    if !table.foreign_keys.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "**Foreign keys**").unwrap();
        writeln!(out).unwrap();
        for fk in &table.foreign_keys {
            write!(
                out,
                "- `{}`: ({}) -> {}({})",
                fk.name,
                fk.local_columns.join(", "),
                fk.referenced_table,
                fk.referenced_columns.join(", ")
            )
            .unwrap();
            if let Some(action) = &fk.on_update {
                write!(out, " ON UPDATE {action}").unwrap();
            }
            if let Some(action) = &fk.on_delete {
                write!(out, " ON DELETE {action}").unwrap();
            }
            writeln!(out).unwrap();
        }
    }

    push_ddl(&mut out, &table.ddl);
    Documentation::new(
        DocumentationKind::Table,
        &table.name,
        out.trim_end().to_string(),
        range,
    )
}

fn view_documentation(view: &View, range: Range) -> Documentation {
    let mut out = String::new();
    writeln!(out, "### {} (view)", view.name).unwrap();
    if let Some(comment) = non_empty(&view.comment) {
        writeln!(out).unwrap();
        writeln!(out, "{comment}").unwrap();
    }
    push_ddl(&mut out, &view.ddl);
    Documentation::new(
        DocumentationKind::View,
        &view.name,
        out.trim_end().to_string(),
        range,
    )
}

fn function_documentation(function: &Function, range: Range) -> Documentation {
    let mut out = String::new();
    writeln!(out, "### {}", function.name).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "`{}`", function.signature()).unwrap();
    if let Some(doc) = non_empty(&function.doc) {
        writeln!(out).unwrap();
        writeln!(out, "{doc}").unwrap();
    }
    push_ddl(&mut out, &function.ddl);
    Documentation::new(
        DocumentationKind::Function,
        &function.name,
        out.trim_end().to_string(),
        range,
    )
}

fn push_ddl(out: &mut String, ddl: &Option<String>) {
    if let Some(ddl) = non_empty(ddl) {
        writeln!(out).unwrap();
        writeln!(out, "```sql").unwrap();
        writeln!(out, "{}", ddl.trim_end()).unwrap();
        writeln!(out, "```").unwrap();
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Escapes a value for a Markdown table cell.
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
