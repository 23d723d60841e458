//! CLI smoke tests for the lawdesk-server binary.

use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_lawdesk_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_lawdesk-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute lawdesk-server")
}

async fn run_lawdesk_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_lawdesk-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Write `body` under a fresh temp dir whose path is also used as `server.home_dir`.
fn write_config(name: &str, body: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let home = temp_dir.path().to_string_lossy().replace('\\', "/");
    let content = format!(
        "server:\n  home_dir: \"{home}\"\n  host: \"127.0.0.1\"\n  port: 0\n{body}"
    );
    let config_path = temp_dir.path().join(name);
    std::fs::write(&config_path, content).expect("Failed to write config file");
    (temp_dir, config_path)
}

#[test]
fn test_cli_help_command() {
    let output = run_lawdesk_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lawdesk-server") || stdout.contains("LawDesk"));
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_lawdesk_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lawdesk-server"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_lawdesk_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report an error: {stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_lawdesk_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file not found"),
        "Should mention config file issue: {stderr}"
    );
}

#[test]
fn test_cli_config_flag_short_form() {
    let output = run_lawdesk_server(&["-c", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "{stderr}");
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_lawdesk_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("yaml") || stderr.contains("YAML") || stderr.contains("figment"),
        "Should mention YAML parsing issue: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let (_dir, config_path) = write_config(
        "valid.yaml",
        r#"
database:
  url: "sqlite://database/lawdesk.db"

logging:
  default:
    console_level: info
    file: "logs/lawdesk.log"
    file_level: info
    max_backups: 3
    max_size_mb: 10

modules:
  law_office:
    enforce_references: true
"#,
    );

    let output = run_lawdesk_server(&["--config", config_path.to_str().unwrap(), "check"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "STDOUT: {stdout}\nSTDERR: {stderr}");
    assert!(stdout.contains("Configuration check passed"), "{stdout}");
}

#[test]
fn test_cli_check_rejects_unknown_module_keys() {
    let (_dir, config_path) = write_config(
        "typo.yaml",
        r#"
modules:
  law_office:
    enforce_refs: true
"#,
    );

    let output = run_lawdesk_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("law_office"), "{stderr}");
}

#[test]
fn test_cli_check_rejects_bad_bind_address() {
    let (_dir, config_path) = write_config(
        "bind.yaml",
        r#"
modules:
  api_ingress:
    bind_addr: "not-an-address"
"#,
    );

    let output = run_lawdesk_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bind address"), "{stderr}");
}

#[test]
fn test_cli_mock_flag() {
    let (_dir, config_path) = write_config(
        "mock.yaml",
        r#"
database:
  url: "mongodb://localhost/nonexistent"
"#,
    );

    // Without --mock the unknown scheme is rejected.
    let output = run_lawdesk_server(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success());

    let output =
        run_lawdesk_server(&["--config", config_path.to_str().unwrap(), "--mock", "check"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "Should succeed with mock database: {stderr}"
    );
}

#[test]
fn test_cli_print_config() {
    let (_dir, config_path) = write_config("print.yaml", "");

    let output = run_lawdesk_server(&[
        "--config",
        config_path.to_str().unwrap(),
        "--port",
        "9311",
        "--print-config",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9311"), "{stdout}");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_lawdesk_server(&["run", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Start the server"), "{stdout}");

    let output = run_lawdesk_server(&["check", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Check configuration"), "{stdout}");
}

#[tokio::test]
async fn test_cli_run_command_with_mock_database() {
    let (_dir, config_path) = write_config("run.yaml", "");

    let result = run_lawdesk_server_with_timeout(
        &["--config", config_path.to_str().unwrap(), "--mock", "run"],
        Duration::from_secs(5),
    )
    .await;

    match result {
        // Still serving when the timeout hit.
        Err(err) => assert!(err.to_string().contains("elapsed"), "{err}"),
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("Server exited early.\nSTDOUT: {stdout}\nSTDERR: {stderr}");
        }
    }
}
