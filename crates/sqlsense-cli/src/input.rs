//! Input handling for the SQL buffer, the catalog and the configuration.

use anyhow::{Context, Result};
use sqlsense_core::{AssistConfig, BufferSnapshot, Catalog, Position, TextBuffer};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read the SQL buffer from `file`, or from stdin when no file is given.
pub fn read_sql(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => read_from_stdin(),
    }
}

fn read_from_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;
    Ok(content)
}

/// Load and validate a catalog; no path means an empty catalog.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::default());
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog file: {}", path.display()))?;
    Catalog::from_json_reader(BufReader::new(file))
        .with_context(|| format!("Invalid catalog file: {}", path.display()))
}

/// Load the assistant configuration; no path means the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AssistConfig> {
    let Some(path) = path else {
        return Ok(AssistConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Position just after the last character of the buffer.
pub fn end_of_buffer(buffer: &BufferSnapshot) -> Position {
    let line = buffer.line_count();
    Position::new(line, buffer.line_text(line).chars().count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SELECT * FROM users").unwrap();

        let sql = read_sql(Some(file.path())).unwrap();
        assert!(sql.contains("SELECT * FROM users"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_sql(Some(&PathBuf::from("/nonexistent/file.sql")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"tables": [{{"name": "users", "columns": [{{"name": "id", "order": 1}}]}}]}}]"#
        )
        .unwrap();

        let catalog = load_catalog(Some(file.path())).unwrap();
        assert_eq!(catalog.databases[0].tables[0].name, "users");
        assert!(load_catalog(None).unwrap().databases.is_empty());
    }

    #[test]
    fn test_invalid_catalog_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"tables": [{{"name": "t"}}, {{"name": "T"}}]}}]"#
        )
        .unwrap();

        let err = load_catalog(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid catalog file"));
        assert!(format!("{err:#}").contains("duplicate table"));
    }

    #[test]
    fn test_load_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"dialect": "sqlite", "maxItems": 10}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.dialect, sqlsense_core::Dialect::Sqlite);
        assert_eq!(config.max_items, Some(10));
        assert_eq!(load_config(None).unwrap(), AssistConfig::default());
    }

    #[test]
    fn test_end_of_buffer() {
        assert_eq!(
            end_of_buffer(&BufferSnapshot::new("SELECT 1;\nSELECT é")),
            Position::new(2, 9)
        );
        assert_eq!(
            end_of_buffer(&BufferSnapshot::new("SELECT 1\n")),
            Position::new(2, 1)
        );
    }
}
