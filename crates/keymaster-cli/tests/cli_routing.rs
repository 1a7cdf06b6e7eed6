//! CLI binary integration tests.
//!
//! These tests exercise the compiled `keymaster` binary: top-level command
//! routing, help text, and the client commands against a live server.

use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;

use keymaster_gateway::{Gateway, GatewayConfig};
use keymaster_store::{Database, SqliteCredentialRepository};
use tempfile::TempDir;
use tokio::net::TcpListener;

fn keymaster_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_keymaster"));
    cmd.env_remove("KEYMASTER_SERVER_URL").env_remove("RUST_LOG");
    cmd
}

/// Run the binary off the async runtime so the in-process server keeps serving.
async fn run(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        keymaster_cmd()
            .args(&args)
            .output()
            .expect("failed to run keymaster")
    })
    .await
    .unwrap()
}

async fn start_server() -> String {
    let db = Database::in_memory().await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let gateway = Gateway::new(
        GatewayConfig::default(),
        Arc::new(SqliteCredentialRepository::from_database(&db)),
    );
    tokio::spawn(async move {
        let _ = gateway.serve(listener).await;
    });
    format!("http://{addr}")
}

fn write_spec(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("spec.json");
    std::fs::write(&path, content).unwrap();
    path
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_cli_version() {
    let output = keymaster_cmd().arg("version").output().unwrap();
    assert!(output.status.success(), "version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("keymaster"),
        "version output should contain 'keymaster', got: {}",
        stdout
    );
}

#[test]
fn test_cli_help() {
    let output = keymaster_cmd().arg("--help").output().unwrap();
    assert!(output.status.success(), "--help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["serve", "add", "get", "update", "reissue", "list"] {
        assert!(
            stdout.contains(command),
            "help output should mention '{}', got: {}",
            command,
            stdout
        );
    }
}

#[test]
fn test_cli_unknown_command() {
    let output = keymaster_cmd().arg("nonexistent-command").output().unwrap();
    assert!(
        !output.status.success(),
        "unknown command should return non-zero exit code"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_add_get_list() {
    let server = start_server().await;
    let dir = TempDir::new().unwrap();
    let spec = write_spec(
        &dir,
        r#"{"AppNames":[{"AppName":"com.example.app"}],"Keys":[{"Name":"api_key","Info":"abc123"}]}"#,
    );
    let out_file = dir.path().join("envelope.json");

    let output = run(args(&[
        "--server",
        &server,
        "add",
        "--spec",
        spec.to_str().unwrap(),
        "--output",
        out_file.to_str().unwrap(),
    ]))
    .await;
    assert!(output.status.success(), "add failed: {:?}", output);
    let written = std::fs::read_to_string(&out_file).unwrap();
    assert!(written.contains("cypherKey"));

    let output = run(args(&["--server", &server, "get", "com.example.app", "--decrypt"])).await;
    assert!(output.status.success(), "get failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cypherText"));
    assert!(stdout.contains("\"api_key\": \"abc123\""));

    let output = run(args(&["--server", &server, "list"])).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Credentials Set 0"));
    assert!(stdout.contains("com.example.app"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_reports_server_error() {
    let server = start_server().await;

    let output = run(args(&["--server", &server, "get", "unknown.app"])).await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("404 Not Found"), "stderr: {}", stderr);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_empty_list_names_server() {
    let server = start_server().await;

    let output = run(args(&["--server", &server, "list"])).await;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no credential sets"));
    assert!(stdout.contains(&server));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_rejects_invalid_spec_before_sending() {
    let dir = TempDir::new().unwrap();
    let spec = write_spec(&dir, "{ not json");

    // Nothing listens here; the spec must fail first.
    let output = run(args(&[
        "--server",
        "http://127.0.0.1:1",
        "add",
        "--spec",
        spec.to_str().unwrap(),
    ]))
    .await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not valid JSON"), "stderr: {}", stderr);
}
