//! CLI integration tests for feedcast
//!
//! None of these reach the network: they stop at argument parsing or at
//! configuration errors, which happen before the feed is fetched.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn feedcast() -> Command {
    let mut cmd = Command::cargo_bin("feedcast").unwrap();
    cmd.env_remove("FEEDCAST_CONFIG")
        .env_remove("FEEDCAST_API_BASE_URL")
        .env_remove("FEEDCAST_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_flag_output() {
    feedcast()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Announce new RSS/Atom feed entries"))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--access-token"))
        .stdout(predicate::str::contains("--secret-type"))
        .stdout(predicate::str::contains("--api-base-url"))
        .stdout(predicate::str::contains("--no-dry-run"))
        .stdout(predicate::str::contains("--loglevel"))
        .stdout(predicate::str::contains("--days"))
        .stdout(predicate::str::contains("--posts"))
        .stdout(predicate::str::contains("--test-toot"));
}

#[test]
fn test_version_flag_output() {
    feedcast()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("feedcast"));
}

#[test]
fn test_missing_url_is_usage_error() {
    feedcast()
        .args(["--access-token", "-", "--secret-type", "arg"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_unknown_secret_type_rejected() {
    feedcast()
        .args([
            "--url",
            "http://127.0.0.1:9/feed.xml",
            "--access-token",
            "token",
            "--secret-type",
            "vault",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid secret type"));
}

#[test]
fn test_unknown_log_level_rejected() {
    feedcast()
        .args([
            "--url",
            "http://127.0.0.1:9/feed.xml",
            "--access-token",
            "-",
            "--secret-type",
            "arg",
            "--loglevel",
            "VERBOSE",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid log level"));
}

#[test]
fn test_missing_env_secret_is_config_error() {
    feedcast()
        .env_remove("FEEDCAST_CLI_TEST_TOKEN")
        .args([
            "--url",
            "http://127.0.0.1:9/feed.xml",
            "--access-token",
            "FEEDCAST_CLI_TEST_TOKEN",
            "--secret-type",
            "env",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains(
            "Environment variable FEEDCAST_CLI_TEST_TOKEN is not set",
        ));
}

#[test]
fn test_unreadable_secret_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("no-such-token");

    feedcast()
        .args([
            "--url",
            "http://127.0.0.1:9/feed.xml",
            "--access-token",
            missing.to_str().unwrap(),
            "--secret-type",
            "file",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to read secret file"));
}

#[test]
fn test_invalid_strip_pattern_is_config_error() {
    feedcast()
        .args([
            "--url",
            "http://127.0.0.1:9/feed.xml",
            "--access-token",
            "-",
            "--secret-type",
            "arg",
            "--strip",
            "(unclosed",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid sanitize pattern"));
}

#[test]
fn test_broken_config_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "posts = \"lots\"").unwrap();

    feedcast()
        .args([
            "--url",
            "http://127.0.0.1:9/feed.xml",
            "--access-token",
            "-",
            "--secret-type",
            "arg",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse config"));
}
