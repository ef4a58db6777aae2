//! CLI smoke tests for the tablekit-cli binary
//!
//! These tests run the compiled binary against throwaway configuration files
//! and check exit status plus the printed output.

use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Helper to run the tablekit-cli binary with given arguments
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tablekit-cli"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute tablekit-cli")
}

fn write_config(dir: &Path, tables: &str) -> String {
    let home = dir.join("home").to_string_lossy().replace('\\', "/");
    let content = format!(
        r#"
home_dir: "{home}"
database:
  url: "sqlite::memory:"
logging:
  default:
    console_level: "off"
    file: ""
modules:
  datatable:
    base_path: /app
{tables}
"#
    );
    let path = dir.join("tablekit.yaml");
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

const PEOPLE: &str = r#"
    tables:
      people:
        source:
          from: people
        columns:
          - { title: Id, field: id }
          - { title: Name, field: name, orderable: false }
"#;

#[test]
fn test_cli_help_command() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("query"), "Should contain 'query' subcommand");
    assert!(stdout.contains("columns"), "Should contain 'columns' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tablekit-cli"), "Should contain binary name");
}

#[test]
fn test_cli_invalid_command() {
    let output = run_cli(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_cli(&["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Config file not found"),
        "Should mention config file issue: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_cli(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_check_lists_tables() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), PEOPLE);

    let output = run_cli(&["--config", &config, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("table people -> /app/datatables/people"));
}

#[test]
fn test_cli_check_rejects_table_without_columns() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tables = r#"
    tables:
      empty:
        source:
          from: things
        columns: []
"#;
    let config = write_config(temp_dir.path(), tables);

    let output = run_cli(&["--config", &config, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("declares no columns"), "stderr: {stderr}");
}

#[test]
fn test_cli_columns_in_legacy_vocabulary() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), PEOPLE);

    let output = run_cli(&["--config", &config, "columns", "people", "--protocol", "legacy"]);
    assert!(output.status.success());

    let meta: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("columns output is JSON");
    assert_eq!(meta[0]["sTitle"], "Id");
    assert_eq!(meta[1]["bSortable"], false);
}

#[test]
fn test_cli_columns_client_settings() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), PEOPLE);

    let output = run_cli(&["--config", &config, "columns", "people", "--client"]);
    assert!(output.status.success());

    let client: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("client output is JSON");
    assert_eq!(client["ajax"]["url"], "/app/datatables/people");
}

#[test]
fn test_cli_query_unknown_table() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), PEOPLE);

    let output = run_cli(&["--config", &config, "query", "nope", "--params", "draw=1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Table not found: nope"), "stderr: {stderr}");
}

#[test]
fn test_cli_query_rejects_unknown_protocol() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), PEOPLE);

    let output = run_cli(&["--config", &config, "query", "people", "--protocol", "soap"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown protocol"), "stderr: {stderr}");
}

#[test]
fn test_cli_print_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), PEOPLE);

    let output = run_cli(&["--config", &config, "--print-config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("database:"));
    assert!(stdout.contains("datatable:"));
}

#[test]
fn test_cli_database_url_override_is_checked() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), PEOPLE);

    let output = run_cli(&[
        "--config",
        &config,
        "--database-url",
        "oracle://db/x",
        "check",
    ]);
    assert!(!output.status.success(), "unknown DSN scheme should fail");
}
