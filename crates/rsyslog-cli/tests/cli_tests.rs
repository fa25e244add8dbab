//! Integration tests for the rsyslog-converge binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

/// Get a Command for the rsyslog-converge binary
fn converge_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rsyslog-converge"));
    cmd.env_remove("RSYSLOG_CONVERGE_FAMILY")
        .env_remove("RSYSLOG_CONVERGE_STYLE")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    converge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rsyslog"));
}

#[test]
fn test_version_output() {
    converge_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rsyslog-converge"));
}

// ============================================================================
// Validate Tests
// ============================================================================

#[test]
fn test_validate_defaults() {
    converge_cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_rejects_tls_over_udp() {
    let dir = tempdir().unwrap();
    let attributes = dir.path().join("attributes.json");
    fs::write(
        &attributes,
        r#"{"enable_tls": true, "tls_ca_file": "/etc/path/to/ssl-ca.crt", "protocol": "udp"}"#,
    )
    .unwrap();

    converge_cmd()
        .args(["validate", "--attributes"])
        .arg(&attributes)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("protocol"));
}

#[test]
fn test_validate_json_reports_violation() {
    let dir = tempdir().unwrap();
    let attributes = dir.path().join("attributes.yaml");
    fs::write(&attributes, "port: 70000\n").unwrap();

    converge_cmd()
        .args(["validate", "--json", "--attributes"])
        .arg(&attributes)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"valid\": false"))
        .stdout(predicate::str::contains("\"attribute\": \"port\""));
}

#[test]
fn test_missing_attribute_file_fails() {
    converge_cmd()
        .args(["validate", "--attributes", "/nonexistent/attributes.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Packages Tests
// ============================================================================

#[test]
fn test_packages_follow_family() {
    let dir = tempdir().unwrap();
    let attributes = dir.path().join("attributes.toml");
    fs::write(&attributes, "tls_ca_file = \"/etc/path/to/ssl-ca.crt\"\nuse_relp = true\n").unwrap();

    converge_cmd()
        .args(["packages", "--json", "--family", "ubuntu", "--attributes"])
        .arg(&attributes)
        .assert()
        .success()
        .stdout(predicate::str::contains("rsyslog-openssl"))
        .stdout(predicate::str::contains("rsyslog-relp"))
        .stdout(predicate::str::contains("rsyslog-gnutls").not());

    converge_cmd()
        .args(["packages", "--attributes"])
        .arg(&attributes)
        .env("RSYSLOG_CONVERGE_FAMILY", "centos")
        .assert()
        .success()
        .stdout(predicate::str::contains("rsyslog-gnutls"));
}

// ============================================================================
// Render Tests
// ============================================================================

#[test]
fn test_render_single_file() {
    converge_cmd()
        .args(["render", "--file", "default-rules", "--family", "rhel"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Config generated by rsyslog-converge"))
        .stdout(predicate::str::contains("mail.*    -/var/log/maillog"));
}

#[test]
fn test_render_absent_file_fails() {
    converge_cmd()
        .args(["render", "--file", "imfile-watch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("35-imfile.conf is not rendered"));
}

#[test]
fn test_render_legacy_watch_file() {
    let dir = tempdir().unwrap();
    let attributes = dir.path().join("attributes.json");
    fs::write(&attributes, r#"{"imfile": {"PollingInterval": 10}}"#).unwrap();

    converge_cmd()
        .args(["render", "--file", "35-imfile.conf", "--style", "legacy", "--attributes"])
        .arg(&attributes)
        .assert()
        .success()
        .stdout(predicate::str::contains("PollingInterval 10"))
        .stdout(predicate::str::contains("$ModLoad imfile").not());
}

// ============================================================================
// Diff and Converge Tests
// ============================================================================

#[test]
fn test_diff_against_empty_root() {
    let root = tempdir().unwrap();

    converge_cmd()
        .args(["diff", "--json", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"restart_requested\": true"))
        .stdout(predicate::str::contains("\"status\": \"created\""));

    assert!(!root.path().join("etc").exists());
}

#[test]
fn test_converge_dry_run_writes_nothing() {
    let root = tempdir().unwrap();

    converge_cmd()
        .args(["converge", "--dry-run", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"));

    assert!(!root.path().join("etc/rsyslog.conf").exists());
}

#[test]
fn test_converge_then_converged() {
    let root = tempdir().unwrap();

    converge_cmd()
        .args(["converge", "--no-chown", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("restart"));

    let main = fs::read_to_string(root.path().join("etc/rsyslog.conf")).unwrap();
    assert!(main.contains("$ModLoad imuxsock"));

    converge_cmd()
        .args(["converge", "--no-chown", "--json", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"restart_requested\": false"));

    converge_cmd()
        .args(["diff", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes needed"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    converge_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rsyslog-converge"));
}
