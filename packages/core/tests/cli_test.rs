//! CLI integration tests using assert_cmd.
//!
//! These tests verify that the CLI interface works correctly without
//! reaching any secret store.

mod common;

use assert_cmd::cargo_bin_cmd;
use common::TestContext;
use predicates::prelude::*;

#[test]
fn test_cli_help_flag() {
    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--version").assert().success();
}

#[test]
fn test_unknown_loader_type_fails() {
    let ctx = TestContext::new().unwrap();
    let config = ctx
        .create_file(
            "secrets.yml",
            "app:\n  type: vault\n  secretId: prod/app\n  API_KEY:\n",
        )
        .unwrap();

    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("specified loader vault not found"));
}

#[test]
fn test_unknown_entry_fails() {
    let ctx = TestContext::new().unwrap();
    let config = ctx
        .create_file("secrets.yml", "app:\n  type: aws\n  secretId: prod/app\n")
        .unwrap();

    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--config")
        .arg(&config)
        .arg("other")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "specified secret other not found in the configuration file",
        ));
}

#[test]
fn test_missing_config_file_fails() {
    let ctx = TestContext::new().unwrap();

    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--config")
        .arg(ctx.temp_path.join("absent.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_malformed_config_fails() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.create_file("secrets.yml", "app: [unclosed\n").unwrap();

    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn test_invalid_variable_name_fails() {
    let ctx = TestContext::new().unwrap();
    let config = ctx
        .create_file(
            "secrets.yml",
            "app:\n  type: aws\n  secretId: prod/app\n  BAD-NAME:\n",
        )
        .unwrap();

    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration validation failed"))
        .stderr(predicate::str::contains("'BAD-NAME' is not a valid environment variable name"));
}

#[test]
fn test_discovers_config_in_parent_directory() {
    let ctx = TestContext::new().unwrap();
    ctx.create_file(
        ".secretsenv.yml",
        "app:\n  type: unknown-backend\n  secretId: prod/app\n",
    )
    .unwrap();
    let nested = ctx.create_dir("a/b/c").unwrap();

    // Reaching the loader lookup proves the parent config was found.
    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.current_dir(&nested)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "specified loader unknown-backend not found",
        ));
}

#[test]
fn test_empty_config_succeeds_with_no_output() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.create_file("secrets.yml", "{}\n").unwrap();

    let mut cmd = cargo_bin_cmd!("secretsenv");
    cmd.arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
