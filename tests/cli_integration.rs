//! Integration tests for the cardkeeper CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Backup create/restore require an interactive password prompt, so the
//! coverage here focuses on the non-interactive surface; the engine itself
//! is covered by the library tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper: get a Command pointing at the cardkeeper binary with an
/// isolated data directory.
fn cardkeeper(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cardkeeper").expect("binary should exist");
    cmd.env("CARDKEEPER_DATA_DIR", data_dir.path());
    cmd
}

#[test]
fn help_flag_shows_usage() {
    let dir = TempDir::new().unwrap();
    cardkeeper(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("backup"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn backup_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    cardkeeper(&dir)
        .args(["backup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("restore"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("prune"))
        .stdout(predicate::str::contains("auto"));
}

#[test]
fn init_creates_data_directories() {
    let dir = TempDir::new().unwrap();
    cardkeeper(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized cardkeeper"));

    assert!(dir.path().join("data").exists());
    assert!(dir.path().join("backups").exists());
    assert!(dir.path().join("config.json").exists());
}

#[test]
fn status_shows_empty_counts() {
    let dir = TempDir::new().unwrap();
    cardkeeper(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Users:       0"))
        .stdout(predicate::str::contains("Credentials: 0"));
}

#[test]
fn config_shows_paths_and_retention() {
    let dir = TempDir::new().unwrap();
    cardkeeper(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup directory:"))
        .stdout(predicate::str::contains("keep 10 backups"));
}

#[test]
fn backup_list_with_no_backups() {
    let dir = TempDir::new().unwrap();
    cardkeeper(&dir)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));
}

#[test]
fn backup_verify_rejects_unknown_file() {
    let dir = TempDir::new().unwrap();
    cardkeeper(&dir)
        .args(["backup", "verify", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup not found"));
}
