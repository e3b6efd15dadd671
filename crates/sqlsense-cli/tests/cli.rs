use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::{tempdir, TempDir};

const CATALOG: &str = r#"[
  {
    "schema": "public",
    "tables": [
      {
        "name": "users",
        "comment": "User accounts",
        "columns": [
          { "name": "id", "order": 1, "dataType": "INT" },
          { "name": "name", "order": 2, "dataType": "VARCHAR" }
        ]
      },
      {
        "name": "roles",
        "columns": [{ "name": "title", "order": 1 }]
      }
    ],
    "functions": []
  }
]"#;

const SCRIPT: &str = "SELECT 1;\n\nUPDATE roles\nSET title = 'x';\n";

struct Fixture {
    _dir: TempDir,
    catalog: PathBuf,
    sql: PathBuf,
}

fn fixture(sql: &str) -> Fixture {
    let dir = tempdir().expect("temp dir");
    let catalog = dir.path().join("catalog.json");
    let sql_path = dir.path().join("query.sql");
    std::fs::write(&catalog, CATALOG).expect("write catalog");
    std::fs::write(&sql_path, sql).expect("write sql");
    Fixture {
        _dir: dir,
        catalog,
        sql: sql_path,
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sqlsense"))
        .args(args)
        .env_remove("SQLSENSE_LOG")
        .output()
        .expect("run CLI")
}

fn labels(json: &Value) -> Vec<&str> {
    json["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item["label"].as_str().expect("label"))
        .collect()
}

#[test]
fn test_qualified_completion_json() {
    let fx = fixture("SELECT u. FROM users u");
    let output = run(&[
        "-C",
        path_str(&fx.catalog),
        "--at",
        "1:10",
        "-f",
        "json",
        path_str(&fx.sql),
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    let json: Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["mode"], "complete");
    assert_eq!(labels(&json), vec!["id", "name"]);
    assert_eq!(json["replaceRange"]["start"]["column"], 10);
}

#[test]
fn test_completion_from_stdin_at_end_of_buffer() {
    let dir = tempdir().expect("temp dir");
    let catalog = dir.path().join("catalog.json");
    std::fs::write(&catalog, CATALOG).expect("write catalog");

    let mut child = Command::new(env!("CARGO_BIN_EXE_sqlsense"))
        .args(["-C", path_str(&catalog), "-f", "json", "--compact"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn CLI");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"SELECT * FROM ")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    let json: Value = serde_json::from_str(&stdout).expect("valid JSON");
    let labels = labels(&json);
    assert_eq!(&labels[..2], &["users", "roles"]);
}

#[test]
fn test_hover_table_text() {
    let fx = fixture("SELECT * FROM users");
    let output = run(&[
        "-C",
        path_str(&fx.catalog),
        "--mode",
        "hover",
        "--at",
        "1:16",
        path_str(&fx.sql),
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.starts_with("### users"), "Expected heading: {stdout}");
    assert!(stdout.contains("User accounts"), "Expected comment: {stdout}");
    assert!(stdout.contains("| id | INT |"), "Expected column row: {stdout}");
}

#[test]
fn test_statement_span_and_starts() {
    let fx = fixture(SCRIPT);

    let span = run(&["--mode", "span", "--at", "4:3", path_str(&fx.sql)]);
    assert!(span.status.success());
    assert_eq!(String::from_utf8_lossy(&span.stdout), "3-4\n");

    let starts = run(&["--mode", "starts", "-f", "json", "-c", path_str(&fx.sql)]);
    assert!(starts.status.success());
    assert_eq!(
        String::from_utf8_lossy(&starts.stdout).trim(),
        r#"{"mode":"starts","starts":[1,3]}"#
    );
}

#[test]
fn test_strict_fails_when_nothing_found() {
    let fx = fixture("SELECT 1");
    let output = run(&[
        "-C",
        path_str(&fx.catalog),
        "--mode",
        "hover",
        "--at",
        "1:3",
        "--strict",
        path_str(&fx.sql),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Nothing to document here."));
}

#[test]
fn test_missing_catalog_warns_unless_quiet() {
    let fx = fixture("SELECT ");

    let noisy = run(&["--at", "1:8", path_str(&fx.sql)]);
    assert!(noisy.status.success());
    assert!(String::from_utf8_lossy(&noisy.stderr).contains("no catalog given"));

    let quiet = run(&["--at", "1:8", "-q", path_str(&fx.sql)]);
    assert!(quiet.status.success());
    assert!(!String::from_utf8_lossy(&quiet.stderr).contains("no catalog given"));
}

#[test]
fn test_invalid_catalog_is_config_error() {
    let fx = fixture("SELECT ");
    std::fs::write(
        &fx.catalog,
        r#"[{"tables": [{"name": "t"}, {"name": "T"}]}]"#,
    )
    .expect("write catalog");

    let output = run(&["-C", path_str(&fx.catalog), path_str(&fx.sql)]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(66), "stderr: {stderr}");
    assert!(stderr.contains("sqlsense: error: Invalid catalog file"), "{stderr}");
    assert!(stderr.contains("duplicate table `T`"), "{stderr}");
}

#[test]
fn test_missing_input_file_is_config_error() {
    let output = run(&["/nonexistent/query.sql"]);
    assert_eq!(output.status.code(), Some(66));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read file"));
}

#[test]
fn test_dialect_flag_filters_builtins() {
    let fx = fixture("SELECT ");
    let json_for = |dialect: &str| -> Value {
        let output = run(&[
            "-C",
            path_str(&fx.catalog),
            "-d",
            dialect,
            "--at",
            "1:8",
            "-f",
            "json",
            path_str(&fx.sql),
        ]);
        assert!(output.status.success());
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("valid JSON")
    };

    let sqlite = json_for("sqlite");
    let postgres = json_for("postgres");
    assert!(labels(&sqlite).contains(&"GROUP_CONCAT"));
    assert!(!labels(&sqlite).contains(&"STRING_AGG"));
    assert!(labels(&postgres).contains(&"STRING_AGG"));
    assert!(!labels(&postgres).contains(&"GROUP_CONCAT"));
}
