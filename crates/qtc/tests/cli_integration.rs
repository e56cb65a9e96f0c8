//! CLI integration tests for the qtc command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Configuration problems and bad input are reported before any request
//!
//! Note: no test here needs a reachable service.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the qtc binary.
fn qtc() -> Command {
    let mut cmd = Command::cargo_bin("qtc").unwrap();
    cmd.env_remove("QTC_CONFIG").env_remove("QTC_TOKEN");
    cmd
}

/// Write a config file into `dir` and return its path.
fn config_file(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("qtcrc.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

/// A config whose services all point at a closed local port.
const UNREACHABLE: &str = r#"
[eds]
backend-id = "b1"
address = "http://127.0.0.1:1"

[mws]
socket-id = "s1"
address = "http://127.0.0.1:1"
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    qtc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Qt Cloud Services"));
}

#[test]
fn test_version_displays() {
    qtc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("qtc"));
}

#[test]
fn test_help_lists_subcommands() {
    qtc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("eds"))
        .stdout(predicate::str::contains("mws"))
        .stdout(predicate::str::contains("mar"))
        .stdout(predicate::str::contains("platform"));
}

#[test]
fn test_eds_help_lists_operations() {
    qtc()
        .args(["eds", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("attach"))
        .stdout(predicate::str::contains("download"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Flag Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_global_flags_accepted() {
    qtc()
        .args(["--verbose", "--token", "t", "--config", "/tmp/none", "--help"])
        .assert()
        .success();
}

#[test]
fn test_unknown_subcommand_rejected() {
    qtc()
        .arg("storage")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_missing_collection_argument_rejected() {
    qtc()
        .args(["eds", "find"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<COLLECTION>"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration and Input Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_section_reported() {
    let dir = TempDir::new().unwrap();
    let config = config_file(&dir, "");

    qtc()
        .arg("--config")
        .arg(&config)
        .args(["eds", "find", "todos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no [eds] section"));
}

#[test]
fn test_missing_backend_id_reported() {
    let dir = TempDir::new().unwrap();
    let config = config_file(&dir, "[eds]\nsecret = \"s\"\n");

    qtc()
        .arg("--config")
        .arg(&config)
        .args(["eds", "count", "todos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EDS backend id is required"));
}

#[test]
fn test_invalid_config_reported() {
    let dir = TempDir::new().unwrap();
    let config = config_file(&dir, "[eds\n");

    qtc()
        .arg("--config")
        .arg(&config)
        .args(["eds", "find", "todos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn test_invalid_json_reported() {
    let dir = TempDir::new().unwrap();
    let config = config_file(&dir, UNREACHABLE);

    qtc()
        .arg("--config")
        .arg(&config)
        .args(["eds", "insert", "todos", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON for object"));
}

#[test]
fn test_unreachable_service_is_transport_error() {
    let dir = TempDir::new().unwrap();
    let config = config_file(&dir, UNREACHABLE);

    qtc()
        .arg("--config")
        .arg(&config)
        .args(["mws", "address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transport error"));
}
