//! Smoke tests for the dreamhome binary
//!
//! Commands run against `memory://`, so each invocation starts from an
//! empty store.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the caller's config and environment.
fn dreamhome(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dreamhome").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("DATABASE_URL")
        .env_remove("mongourl")
        .env_remove("DREAMHOME_CONFIG")
        .current_dir(home.path());
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    dreamhome(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("counter"));
}

#[test]
fn test_serve_help() {
    let home = TempDir::new().unwrap();
    dreamhome(&home)
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Allow permissive CORS"));
}

#[test]
fn test_counter_next_on_fresh_store_is_one() {
    let home = TempDir::new().unwrap();
    dreamhome(&home)
        .args(["--database-url", "memory://", "counter", "next", "clientId"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_counter_peek_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    dreamhome(&home)
        .args(["--database-url", "memory://", "counter", "peek", "clientId"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_seed_prints_report() {
    let home = TempDir::new().unwrap();
    dreamhome(&home)
        .args(["--database-url", "memory://", "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"inserted\""))
        .stdout(predicate::str::contains("properties"));
}

#[test]
fn test_reset_requires_confirmation() {
    let home = TempDir::new().unwrap();
    dreamhome(&home)
        .args(["--database-url", "memory://", "reset"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_status_reports_connected() {
    let home = TempDir::new().unwrap();
    dreamhome(&home)
        .args(["--database-url", "memory://", "status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"connected\""));
}

#[test]
fn test_config_file_is_read() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("dreamhome.toml");
    std::fs::write(
        &path,
        "[database]\nurl = \"memory://\"\n\n[counters]\nstart_value = 1001\n",
    )
    .unwrap();

    dreamhome(&home)
        .arg("--config")
        .arg(&path)
        .args(["counter", "next", "officeId"])
        .assert()
        .success()
        .stdout("1001\n");
}
