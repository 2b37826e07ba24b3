// ABOUTME: Integration tests for the rds-bluegreen CLI commands.
// ABOUTME: Validates --help output, exit codes and the post-run rerun check.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn rds_bluegreen_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rds-bluegreen"));
    cmd.env_remove("WORK")
        .env_remove("DRY_RUN")
        .env_remove("INPUT_FILE")
        .env("AWS_EC2_METADATA_DISABLED", "true");
    cmd
}

fn write_input(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("input.json");
    fs::write(&path, content).unwrap();
    path
}

const DISABLED_INPUT: &str = r#"{
  "identifier": "test-rds",
  "region": "us-east-1",
  "blue_green_deployment": {"enabled": false}
}"#;

#[test]
fn help_shows_commands() {
    rds_bluegreen_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reconcile"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("post-run"));
}

#[test]
fn reconcile_help_mentions_dry_run_env() {
    rds_bluegreen_cmd()
        .args(["reconcile", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("DRY_RUN"));
}

#[test]
fn plan_with_disabled_input_exits_ok() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, DISABLED_INPUT);

    rds_bluegreen_cmd()
        .args(["--output", "quiet", "plan", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("not_enabled"));
}

#[test]
fn reconcile_reads_input_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, DISABLED_INPUT);

    rds_bluegreen_cmd()
        .env("INPUT_FILE", &input)
        .env("DRY_RUN", "false")
        .arg("reconcile")
        .assert()
        .success()
        .stdout(predicate::str::contains("State: not_enabled"));
}

#[test]
fn json_output_reports_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, DISABLED_INPUT);

    rds_bluegreen_cmd()
        .args(["--output", "json", "plan", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""state":"not_enabled""#))
        .stdout(predicate::str::contains(r#""dry_run":true"#));
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    rds_bluegreen_cmd()
        .args(["plan", "--input"])
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read input file"));
}

#[test]
fn unparseable_dry_run_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, DISABLED_INPUT);

    rds_bluegreen_cmd()
        .env("DRY_RUN", "maybe")
        .args(["reconcile", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a boolean"));
}

#[test]
fn post_run_without_marker_succeeds() {
    let work = tempfile::tempdir().unwrap();

    rds_bluegreen_cmd()
        .env("WORK", work.path())
        .arg("post-run")
        .assert()
        .success();
}

#[test]
fn post_run_with_marker_fails() {
    let work = tempfile::tempdir().unwrap();
    fs::write(work.path().join("rerun"), "").unwrap();

    rds_bluegreen_cmd()
        .env("WORK", work.path())
        .arg("post-run")
        .assert()
        .code(1);
}

#[test]
fn post_run_without_work_fails() {
    rds_bluegreen_cmd()
        .arg("post-run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("WORK environment variable is not set"));
}
