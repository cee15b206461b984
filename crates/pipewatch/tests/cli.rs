//! CLI contract tests for `pw`
//!
//! Runs the binary as a subprocess against temp config files and a gateway
//! address that refuses connections. Checks exit codes, output formats and
//! actionable error messages.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test fixture helpers
// =============================================================================

fn pw() -> Command {
    let mut cmd = Command::cargo_bin("pw").expect("pw binary");
    cmd.env_remove("PIPEWATCH_CONFIG")
        .env_remove("PIPEWATCH_BASE_URL")
        .env_remove("PIPEWATCH_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a pipewatch.toml into a fresh temp dir.
fn write_config(contents: &str) -> (TempDir, String) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("pipewatch.toml");
    std::fs::write(&path, contents).expect("write config");
    let path = path.to_string_lossy().to_string();
    (dir, path)
}

/// Base URL of a local port with nothing listening on it.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// Help and argument parsing
// =============================================================================

#[test]
fn help_lists_commands() {
    pw().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn unknown_format_is_rejected() {
    pw().args(["--format", "yaml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("yaml"));
}

// =============================================================================
// config show
// =============================================================================

#[test]
fn config_show_prints_effective_toml() {
    let (_dir, path) = write_config(
        r#"
[endpoints]
base_url = "http://gateway.internal:8080"

[polling]
interval_ms = 5000
"#,
    );
    pw().args(["--config", &path, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://gateway.internal:8080"))
        .stdout(predicate::str::contains("interval_ms = 5000"))
        .stdout(predicate::str::contains("event_window_days = 30"));
}

#[test]
fn config_show_json_is_parseable() {
    let (_dir, path) = write_config("");
    let output = pw()
        .args(["--config", &path, "--format", "json", "config", "show"])
        .output()
        .expect("run pw");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("config show emits JSON");
    assert_eq!(value["polling"]["interval_ms"], 3000);
}

#[test]
fn base_url_flag_overrides_file() {
    let (_dir, path) = write_config("");
    pw().args([
        "--config",
        &path,
        "--base-url",
        "https://other.example:9443",
        "config",
        "show",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("https://other.example:9443"));
}

#[test]
fn missing_config_file_fails_with_remediation() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("absent.toml");
    pw().args(["--config", &path.to_string_lossy(), "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"))
        .stderr(predicate::str::contains("--config"));
}

#[test]
fn invalid_interval_fails_validation() {
    let (_dir, path) = write_config("[polling]\ninterval_ms = 5\n");
    pw().args(["--config", &path, "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_ms"));
}

// =============================================================================
// Gateway down
// =============================================================================

#[test]
fn snapshot_with_gateway_down_renders_inline_errors() {
    let (_dir, path) = write_config("");
    pw().args([
        "--config",
        &path,
        "--base-url",
        &closed_port_url(),
        "--log-level",
        "error",
        "snapshot",
    ])
    .assert()
    .code(2)
    .stdout(predicate::str::contains("== Processing Stats =="))
    .stdout(predicate::str::contains("Failed to fetch data"))
    .stdout(predicate::str::contains("Last updated:"));
}

#[test]
fn snapshot_json_with_gateway_down_marks_panels_failed() {
    let (_dir, path) = write_config("");
    let output = pw()
        .args([
            "--config",
            &path,
            "--base-url",
            &closed_port_url(),
            "--log-level",
            "error",
            "--format",
            "json",
            "snapshot",
        ])
        .output()
        .expect("run pw");
    assert_eq!(output.status.code(), Some(2));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("snapshot emits JSON");
    assert_eq!(value["processing_stats"]["status"], "failed");
    assert_eq!(value["latest_temperature"]["status"], "failed");
}

#[test]
fn check_run_with_gateway_down_fails() {
    let (_dir, path) = write_config("");
    pw().args([
        "--config",
        &path,
        "--base-url",
        &closed_port_url(),
        "--log-level",
        "error",
        "check",
        "run",
    ])
    .assert()
    .failure()
    .stdout(predicate::str::contains("== Consistency Check =="))
    .stdout(predicate::str::contains("Error: Failed to fetch data"));
}
