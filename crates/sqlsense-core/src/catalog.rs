//! Catalog loading and the flattened lookup index built over it.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use serde::Serialize;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::error::CatalogError;
use crate::types::{Catalog, Column, Function, Table, View};

impl Catalog {
    /// Parses and validates a catalog from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks that table names are unique per database and that column order
    /// strictly increases within each table.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (db_index, database) in self.databases.iter().enumerate() {
            let database_name = database
                .schema
                .clone()
                .unwrap_or_else(|| format!("#{db_index}"));

            let mut seen: Vec<String> = Vec::with_capacity(database.tables.len());
            for table in &database.tables {
                let key = table.name.to_lowercase();
                if seen.contains(&key) {
                    return Err(CatalogError::DuplicateTable {
                        database: database_name,
                        table: table.name.clone(),
                    });
                }
                seen.push(key);

                for pair in table.columns.windows(2) {
                    if pair[1].order <= pair[0].order {
                        return Err(CatalogError::ColumnOrder {
                            table: table.name.clone(),
                            column: pair[1].name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// A column tagged with the table that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub table: String,
    pub column: Column,
}

/// Flattened, read-only view of a [`Catalog`].
///
/// Tables, views, and functions keep catalog order. Name lookups are
/// case-insensitive. A name qualified with a known schema only resolves inside
/// that schema; a bare name resolves to the first database defining it.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    tables: Vec<Table>,
    views: Vec<View>,
    functions: Vec<Function>,
    columns: Vec<Vec<TableColumn>>,
    table_lookup: HashMap<String, usize>,
    view_lookup: HashMap<String, usize>,
    function_lookup: HashMap<String, usize>,
    schemas: HashSet<String>,
}

impl CatalogIndex {
    pub fn new(catalog: &Catalog) -> Self {
        Self::with_builtins(catalog, &[])
    }

    /// Builds the index with `builtins` listed ahead of the catalog's own functions.
    pub fn with_builtins(catalog: &Catalog, builtins: &[Function]) -> Self {
        let mut index = CatalogIndex::default();

        for database in &catalog.databases {
            let schema = database.schema.as_deref();
            if let Some(schema) = schema {
                index.schemas.insert(schema.to_lowercase());
            }

            for table in &database.tables {
                let slot = index.tables.len();
                register(&mut index.table_lookup, schema, &table.name, slot);

                let mut columns: Vec<TableColumn> = table
                    .columns
                    .iter()
                    .map(|column| TableColumn {
                        table: table.name.clone(),
                        column: column.clone(),
                    })
                    .collect();
                columns.sort_by_key(|c| c.column.order);

                index.columns.push(columns);
                index.tables.push(table.clone());
            }

            for view in &database.views {
                let slot = index.views.len();
                register(&mut index.view_lookup, schema, &view.name, slot);
                index.views.push(view.clone());
            }
        }

        let builtins = builtins.iter().map(|function| (None, function));
        let catalog_functions = catalog.databases.iter().flat_map(|db| {
            db.functions
                .iter()
                .map(move |function| (db.schema.as_deref(), function))
        });
        for (schema, function) in builtins.chain(catalog_functions) {
            let slot = index.functions.len();
            register(&mut index.function_lookup, schema, &function.name, slot);
            index.functions.push(function.clone());
        }

        #[cfg(feature = "tracing")]
        debug!(
            tables = index.tables.len(),
            views = index.views.len(),
            functions = index.functions.len(),
            "catalog indexed"
        );

        index
    }

    /// Every table across every database, in catalog order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.lookup(&self.table_lookup, name).map(|slot| &self.tables[slot])
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.lookup(&self.view_lookup, name).map(|slot| &self.views[slot])
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.lookup(&self.function_lookup, name).map(|slot| &self.functions[slot])
    }

    /// Columns of `table`, tagged with the table name. Empty for unknown names.
    pub fn columns(&self, table: &str) -> &[TableColumn] {
        self.lookup(&self.table_lookup, table)
            .map(|slot| self.columns[slot].as_slice())
            .unwrap_or(&[])
    }

    /// Every table paired with its own columns, in catalog order.
    pub fn tables_with_columns(&self) -> impl Iterator<Item = (&Table, &[TableColumn])> {
        self.tables
            .iter()
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Every column of every table, in catalog order.
    pub fn all_columns(&self) -> impl Iterator<Item = &TableColumn> {
        self.columns.iter().flatten()
    }

    /// Resolves `name` exactly first. A qualified name whose schema is known
    /// only matches inside that schema; an unknown qualifier (a database or
    /// catalog prefix, say) falls back to the bare table name.
    fn lookup(&self, map: &HashMap<String, usize>, name: &str) -> Option<usize> {
        let parts: Vec<String> = name
            .split('.')
            .map(|part| unquote(part).to_lowercase())
            .collect();
        if let Some(slot) = map.get(&parts.join(".")) {
            return Some(*slot);
        }

        let (last, qualifier) = parts.split_last()?;
        let schema = qualifier.last()?;
        if self.schemas.contains(schema) {
            map.get(&format!("{schema}.{last}")).copied()
        } else {
            map.get(last).copied()
        }
    }
}

/// Keys `name` both bare and as `schema.name`; earlier entries win.
fn register(map: &mut HashMap<String, usize>, schema: Option<&str>, name: &str, slot: usize) {
    let name = name.to_lowercase();
    if let Some(schema) = schema {
        map.entry(format!("{}.{name}", schema.to_lowercase()))
            .or_insert(slot);
    }
    map.entry(name).or_insert(slot);
}

fn unquote(name: &str) -> &str {
    let trimmed = name.trim();
    for (open, close) in [('"', '"'), ('`', '`'), ('[', ']')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Database;

    fn table(name: &str, columns: &[(&str, u32)]) -> Table {
        Table {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(column, order)| Column::new(*column, *order))
                .collect(),
            ..Default::default()
        }
    }

    fn sample() -> Catalog {
        Catalog {
            databases: vec![
                Database {
                    schema: Some("public".to_string()),
                    tables: vec![
                        table("users", &[("id", 1), ("name", 2)]),
                        table("roles", &[("id", 1), ("title", 2)]),
                    ],
                    functions: vec![Function {
                        name: "get_user_count".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                Database {
                    schema: Some("archive".to_string()),
                    tables: vec![table("Users", &[("legacy_id", 1)])],
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_tables_in_catalog_order() {
        let index = CatalogIndex::new(&sample());
        let names: Vec<&str> = index.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "roles", "Users"]);
    }

    #[test]
    fn test_columns_tagged_and_ordered() {
        let index = CatalogIndex::new(&sample());
        let columns = index.columns("USERS");
        let names: Vec<&str> = columns.iter().map(|c| c.column.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert!(columns.iter().all(|c| c.table == "users"));
    }

    #[test]
    fn test_unknown_names_are_empty() {
        let index = CatalogIndex::new(&sample());
        assert!(index.columns("missing").is_empty());
        assert!(index.table("missing").is_none());
        assert!(index.function("missing").is_none());
    }

    #[test]
    fn test_qualified_and_quoted_lookup() {
        let index = CatalogIndex::new(&sample());
        assert_eq!(index.columns("public.roles").len(), 2);
        assert_eq!(index.columns("\"roles\"").len(), 2);
        assert_eq!(index.columns("public.\"roles\"").len(), 2);
    }

    #[test]
    fn test_schema_qualified_lookup_stays_in_schema() {
        let index = CatalogIndex::new(&sample());
        let names = |table: &str| -> Vec<String> {
            index
                .columns(table)
                .iter()
                .map(|c| c.column.name.clone())
                .collect()
        };

        assert_eq!(names("archive.users"), vec!["legacy_id"]);
        assert_eq!(names("ARCHIVE.\"Users\""), vec!["legacy_id"]);
        assert_eq!(names("public.users"), vec!["id", "name"]);
        assert_eq!(names("users"), vec!["id", "name"]);
        assert!(names("archive.roles").is_empty());
        assert_eq!(index.table("archive.users").unwrap().name, "Users");
    }

    #[test]
    fn test_unknown_qualifier_falls_back_to_bare_name() {
        let index = CatalogIndex::new(&sample());
        assert_eq!(index.columns("warehouse.roles").len(), 2);
        assert_eq!(index.columns("warehouse.archive.users").len(), 1);
        assert!(index.function("public.get_user_count").is_some());
        assert!(index.function("archive.get_user_count").is_none());
    }

    #[test]
    fn test_builtins_precede_catalog_functions() {
        let builtins = vec![Function {
            name: "COUNT".to_string(),
            ..Default::default()
        }];
        let index = CatalogIndex::with_builtins(&sample(), &builtins);
        let names: Vec<&str> = index.functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["COUNT", "get_user_count"]);
        assert!(index.function("count").is_some());
    }

    #[test]
    fn test_validate_rejects_duplicate_tables() {
        let json = r#"[{"schema": "public", "tables": [{"name": "t"}, {"name": "T"}]}]"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTable { .. }));
    }

    #[test]
    fn test_validate_rejects_column_order() {
        let json = r#"[{"tables": [{"name": "t", "columns": [
            {"name": "a", "order": 2}, {"name": "b", "order": 2}
        ]}]}]"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        match err {
            CatalogError::ColumnOrder { table, column } => {
                assert_eq!(table, "t");
                assert_eq!(column, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_table_name_in_two_databases_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        let err = Catalog::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_from_reader() {
        let json = br#"[{"tables": [{"name": "t", "columns": [{"name": "a", "order": 1}]}]}]"#;
        let catalog = Catalog::from_json_reader(&json[..]).unwrap();
        assert_eq!(CatalogIndex::new(&catalog).columns("t").len(), 1);
    }
}
