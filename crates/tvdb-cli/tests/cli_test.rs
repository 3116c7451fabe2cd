#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("episodes"))
        .stdout(predicate::str::contains("search-params"))
        .stdout(predicate::str::contains("legacy"));
}

#[test]
fn test_series_missing_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["series"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id"));
}

#[test]
fn test_series_invalid_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["series", "--id", "simpsons"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_search_requires_criterion() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["search"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_search_rejects_two_criteria() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["search", "--name", "The Simpsons", "--slug", "the-simpsons"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_legacy_detail_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["legacy", "detail", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--id"));
}

#[test]
fn test_missing_api_key() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.env_remove("TVDB_API_KEY")
        .args(["languages", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

#[test]
fn test_config_set_then_show() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act
    let mut set = cargo_bin_cmd!("tvdb");
    set.args(["config", "set", "--key", "TESTKEY", "--timeout-secs", "10", "--dir"])
        .arg(dir.path())
        .assert()
        .success();

    // Assert
    let saved = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(saved.contains("key = \"TESTKEY\""));
    assert!(saved.contains("timeout_secs = 10"));

    let mut show = cargo_bin_cmd!("tvdb");
    show.env("NO_COLOR", "1")
        .args(["config", "show", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("API key: (set)"))
        .stdout(predicate::str::contains("Timeout (s): 10"));
}

#[test]
fn test_config_set_requires_a_value() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["config", "set", "--dir"])
        .arg(dir.path())
        .assert()
        .failure();
    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_rejects_invalid_base_url() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvdb");
    cmd.args(["config", "set", "--base-url", "not a url", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid base URL"));
    assert!(!dir.path().join("config.toml").exists());
}
