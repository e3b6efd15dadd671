#![allow(dead_code)]

use sqlsense_core::{
    AssistConfig, BufferSnapshot, Catalog, Position, SqlAssistant, Suggestion, SuggestionKind,
    TextBuffer,
};

pub const CATALOG_JSON: &str = r#"[
  {
    "schema": "public",
    "tables": [
      {
        "name": "users",
        "comment": "User accounts",
        "ddl": "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(100));",
        "columns": [
          {"name": "id", "comment": "primary key", "order": 1, "nullable": false, "dataType": "INT"},
          {"name": "name", "order": 2, "dataType": "VARCHAR(100)"}
        ],
        "indexes": [{"name": "pk_users", "unique": true, "columns": ["id"], "order": 1}]
      },
      {
        "name": "roles",
        "columns": [
          {"name": "id", "order": 1, "nullable": false, "dataType": "INT"},
          {"name": "title", "order": 2, "dataType": "VARCHAR(50)"}
        ],
        "foreignKeys": [{
          "name": "fk_roles_users", "localColumns": ["id"], "referencedTable": "users",
          "referencedColumns": ["id"], "onDelete": "CASCADE"
        }]
      }
    ],
    "views": [
      {"name": "user_summary", "comment": "One row per user", "ddl": "CREATE VIEW user_summary AS SELECT id FROM users;"}
    ],
    "functions": [
      {
        "name": "get_user_count",
        "parameters": [{"name": "status", "type": "VARCHAR", "order": 1}],
        "returnType": "INT",
        "doc": "Counts users by status"
      }
    ]
  }
]"#;

pub fn sample_catalog() -> Catalog {
    Catalog::from_json_str(CATALOG_JSON).expect("sample catalog is valid")
}

/// Assistant over the sample catalog without the builtin function table.
pub fn assistant() -> SqlAssistant {
    SqlAssistant::new(
        &sample_catalog(),
        AssistConfig {
            builtin_functions: false,
            ..AssistConfig::default()
        },
    )
}

/// Two schemas that both define a `users` table.
pub const TWO_SCHEMA_CATALOG_JSON: &str = r#"[
  {
    "schema": "public",
    "tables": [
      {"name": "users", "comment": "Live accounts", "columns": [{"name": "id", "order": 1}]}
    ]
  },
  {
    "schema": "archive",
    "tables": [
      {"name": "users", "comment": "Retired accounts", "columns": [{"name": "legacy_id", "order": 1}]}
    ]
  }
]"#;

pub fn two_schema_assistant() -> SqlAssistant {
    let catalog = Catalog::from_json_str(TWO_SCHEMA_CATALOG_JSON).expect("catalog is valid");
    SqlAssistant::new(
        &catalog,
        AssistConfig {
            builtin_functions: false,
            ..AssistConfig::default()
        },
    )
}

pub fn assistant_with(config: AssistConfig) -> SqlAssistant {
    SqlAssistant::new(&sample_catalog(), config)
}

/// Splits `sql` at its `|` cursor marker.
pub fn buffer_at_cursor(sql: &str) -> (BufferSnapshot, Position) {
    let offset = sql.find('|').expect("sql must contain cursor marker '|'");
    let buffer = BufferSnapshot::new(sql.replace('|', ""));
    let position = buffer.position_at(offset);
    (buffer, position)
}

pub fn completions(assistant: &SqlAssistant, sql: &str) -> Vec<Suggestion> {
    let (buffer, cursor) = buffer_at_cursor(sql);
    assistant.get_completions(&buffer, cursor)
}

pub fn labels(items: &[Suggestion]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}

pub fn labels_of_kind(items: &[Suggestion], kind: SuggestionKind) -> Vec<&str> {
    items
        .iter()
        .filter(|item| item.kind == kind)
        .map(|item| item.label.as_str())
        .collect()
}
