//! End-to-end tests for the rmk binary

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::create_test_config;
use predicates::prelude::*;
use std::fs;

const CONFIG: &str = r#"
vars:
  GREETING: hello
  WHO:
    command: echo world
targets:
  greet:
    description: Print a greeting
    run: echo ${GREETING} ${WHO}
  fail:
    description: Fail on purpose
    run:
      - echo first
      - exit 7
      - echo never
  tolerant:
    run:
      - exec: exit 4
        continue-on-error: true
      - echo after
  chain:
    deps: [greet, tolerant]
    run: echo chain
"#;

fn rmk() -> Command {
    let mut cmd = Command::cargo_bin("rmk").unwrap();
    cmd.env_remove("RMK_LOG")
        .env_remove("GREETING")
        .env_remove("WHO");
    cmd
}

#[test]
fn test_runs_target_with_computed_variable() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .arg("greet")
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn test_exit_code_matches_failing_step() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .arg("fail")
        .assert()
        .code(7)
        .stdout("first\n")
        .stderr(predicate::str::contains("fail"));
}

#[test]
fn test_continue_on_error_keeps_going() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .arg("tolerant")
        .assert()
        .success()
        .stdout("after\n");
}

#[test]
fn test_prerequisites_run_first() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .args(["-q", "chain"])
        .assert()
        .success()
        .stdout("hello world\nafter\nchain\n");
}

#[test]
fn test_command_line_override() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .args(["GREETING=bye", "greet", "WHO=moon"])
        .assert()
        .success()
        .stdout("bye moon\n");
}

#[test]
fn test_environment_override() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .env("GREETING", "hi")
        .arg("greet")
        .assert()
        .success()
        .stdout("hi world\n");
}

#[test]
fn test_dotenv_file_is_loaded() {
    let (temp_dir, _) = create_test_config(CONFIG);
    fs::write(temp_dir.path().join(".env"), "GREETING=howdy\n").unwrap();
    rmk()
        .current_dir(temp_dir.path())
        .arg("greet")
        .assert()
        .success()
        .stdout("howdy world\n");
}

#[test]
fn test_help_is_default_and_stable() {
    let (temp_dir, _) = create_test_config(CONFIG);
    let expected = "fail   Fail on purpose\n\
                    greet  Print a greeting\n\
                    help   Show this help\n";

    rmk()
        .current_dir(temp_dir.path())
        .assert()
        .success()
        .stdout(expected);
    rmk()
        .current_dir(temp_dir.path())
        .arg("help")
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn test_unknown_target_exits_one() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .arg("deploy")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Target 'deploy' is not defined"));
}

#[test]
fn test_two_targets_rejected() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .args(["greet", "fail"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("only one target"));
}

#[test]
fn test_explicit_config_file() {
    let (temp_dir, config_path) = create_test_config(CONFIG);
    let elsewhere = tempfile::TempDir::new().unwrap();
    rmk()
        .current_dir(elsewhere.path())
        .arg("-f")
        .arg(&config_path)
        .arg("greet")
        .assert()
        .success()
        .stdout("hello world\n");
    drop(temp_dir);
}

#[test]
fn test_dry_run_prints_plan_only() {
    let (temp_dir, _) = create_test_config(CONFIG);
    rmk()
        .current_dir(temp_dir.path())
        .args(["--dry-run", "fail"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("fail:\n")
                .and(predicate::str::contains("echo first"))
                .and(predicate::str::contains("exit 7"))
                .and(predicate::str::starts_with("first").not()),
        );
}

#[test]
fn test_completions() {
    rmk()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rmk"));
}
