//! CLI smoke tests for the lawdesk binary.

use std::process::{Command, Stdio};

use httpmock::prelude::*;
use serde_json::json;

fn run_lawdesk(args: &[&str], base_url: Option<&str>) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lawdesk"));
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    match base_url {
        Some(url) => cmd.env("LAWDESK_BASE_URL", url),
        None => cmd.env_remove("LAWDESK_BASE_URL"),
    };
    cmd.output().expect("Failed to execute lawdesk")
}

#[test]
fn test_cli_help_lists_record_kinds() {
    let output = run_lawdesk(&["--help"], None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for word in ["clients", "cases", "appointments", "--base-url"] {
        assert!(stdout.contains(word), "missing {word}: {stdout}");
    }
}

#[test]
fn test_cli_rejects_malformed_id() {
    let output = run_lawdesk(&["clients", "show", "not-a-uuid"], None);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not-a-uuid"), "{stderr}");
}

#[test]
fn test_cli_delete_requires_confirmation() {
    let output = run_lawdesk(
        &["clients", "delete", "6f1c2a7e-0000-4000-8000-000000000001"],
        Some("http://127.0.0.1:1"),
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--yes"), "{stderr}");
}

#[test]
fn test_cli_lists_clients_from_env_base_url() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET).path("/api/clients");
        then.status(200).json_body(json!([{
            "id": "6f1c2a7e-0000-4000-8000-000000000001",
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@example.com",
            "createdAt": "2024-03-01T09:30:00Z",
            "updatedAt": "2024-03-01T09:30:00Z",
        }]));
    });

    let output = run_lawdesk(&["clients", "list", "--search", "doe"], Some(&server.base_url()));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("John Doe"));
    assert!(stdout.contains("john@example.com"));
    list.assert();
}

#[test]
fn test_cli_add_reports_missing_fields_locally() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/clients");
        then.status(200).json_body(json!([]));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/api/clients");
        then.status(201);
    });

    let output = run_lawdesk(
        &["clients", "add", "--first-name", "John"],
        Some(&server.base_url()),
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lastName"), "{stderr}");
    create.assert_hits(0);
}

#[test]
fn test_cli_unreachable_server_fails() {
    let output = run_lawdesk(&["cases", "list"], Some("http://127.0.0.1:1"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not load"), "{stderr}");
}
