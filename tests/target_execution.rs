//! Integration tests for planning and running targets

mod common;

use common::{create_test_config, RecordingExecutor};
use rmk::cli::{App, Request};
use rmk::config::parse_config;
use rmk::runner::{plan, Context, Engine, Registry, Variables, Verbosity};
use std::fs;
use std::path::PathBuf;

const PROJECT: &str = r#"
default: test
vars:
  VENV: venv
  PYTHON: python3
  REV:
    command: git rev-parse HEAD
  TAG: v${REV}
  UNUSED: ${RMK_SURELY_UNDEFINED_KEY}/cache
targets:
  venv:
    description: Create the virtualenv
    guard:
      - exists: ${VENV}/bin/python
    run: ${PYTHON} -m venv ${VENV}
  install:
    description: Install the package
    deps: venv
    run: ${VENV}/bin/pip install -e .
  lint:
    deps: venv
    run: ${VENV}/bin/ruff check .
  test:
    description: Run the tests
    deps: [install, lint]
    run:
      - ${VENV}/bin/pytest
      - exec: ${VENV}/bin/coverage report
        continue-on-error: true
  release:
    deps: test
    run: echo ${REV}
  tag:
    run: git tag ${TAG}
"#;

fn app() -> App {
    App::from_parts(parse_config(PROJECT).unwrap(), PathBuf::from("rmk.yml")).unwrap()
}

fn request(target: &str) -> Request {
    Request {
        target: Some(target.to_string()),
        verbosity: Verbosity::Silent,
        ..Request::default()
    }
}

#[test]
fn test_diamond_runs_each_target_once() {
    let plan = plan("test", app().registry()).unwrap();
    assert_eq!(plan.targets(), ["venv", "install", "lint", "test"]);

    let executor = RecordingExecutor::new();
    let code = app().run_with(&request("test"), &executor, &mut Vec::new()).unwrap();

    assert_eq!(code, 0);
    assert_eq!(
        executor.commands(),
        vec![
            "python3 -m venv venv",
            "venv/bin/pip install -e .",
            "venv/bin/ruff check .",
            "venv/bin/pytest",
            "venv/bin/coverage report",
        ]
    );
}

#[test]
fn test_default_target_used_without_argument() {
    let executor = RecordingExecutor::new();
    let request = Request {
        verbosity: Verbosity::Silent,
        ..Request::default()
    };
    app().run_with(&request, &executor, &mut Vec::new()).unwrap();
    assert_eq!(executor.commands().last().unwrap(), "venv/bin/coverage report");
}

#[test]
fn test_guard_skips_satisfied_target() {
    let (temp_dir, config_path) = create_test_config(PROJECT);
    fs::create_dir_all(temp_dir.path().join("venv/bin")).unwrap();
    fs::write(temp_dir.path().join("venv/bin/python"), "").unwrap();

    let app = App::with_config_file(config_path).unwrap();
    let executor = RecordingExecutor::new();
    app.run_with(&request("install"), &executor, &mut Vec::new()).unwrap();

    assert_eq!(executor.commands(), vec!["venv/bin/pip install -e ."]);
}

#[test]
fn test_first_failure_halts_with_its_code() {
    let executor = RecordingExecutor::new().fail("venv/bin/pip install -e .", 3);
    let code = app().run_with(&request("test"), &executor, &mut Vec::new()).unwrap();

    assert_eq!(code, 3);
    assert_eq!(
        executor.commands(),
        vec!["python3 -m venv venv", "venv/bin/pip install -e ."]
    );
}

#[test]
fn test_best_effort_step_does_not_fail_run() {
    let executor = RecordingExecutor::new().fail("venv/bin/coverage report", 2);
    let code = app().run_with(&request("test"), &executor, &mut Vec::new()).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn test_overrides_apply_per_run() {
    let app = app();

    let first = RecordingExecutor::new();
    let mut req = request("venv");
    req.assignments = vec![("VENV".to_string(), ".venv".to_string())];
    app.run_with(&req, &first, &mut Vec::new()).unwrap();

    let second = RecordingExecutor::new();
    app.run_with(&request("venv"), &second, &mut Vec::new()).unwrap();

    assert_eq!(first.commands(), vec!["python3 -m venv .venv"]);
    assert_eq!(second.commands(), vec!["python3 -m venv venv"]);
}

#[test]
fn test_override_is_literal() {
    let executor = RecordingExecutor::new();
    let mut req = request("venv");
    req.assignments = vec![("VENV".to_string(), "$${PYTHON}".to_string())];
    app().run_with(&req, &executor, &mut Vec::new()).unwrap();
    assert_eq!(executor.commands(), vec!["python3 -m venv $${PYTHON}"]);
}

#[test]
fn test_computed_variable_only_when_referenced() {
    // TAG mentions REV, but nothing in the lint plan mentions TAG
    let executor = RecordingExecutor::new().fail("git rev-parse HEAD", 128);
    let code = app().run_with(&request("lint"), &executor, &mut Vec::new()).unwrap();
    assert_eq!(code, 0);
    assert!(!executor
        .commands()
        .iter()
        .any(|c| c == "git rev-parse HEAD"));

    let executor = RecordingExecutor::new().stdout("git rev-parse HEAD", "abc123\n");
    app().run_with(&request("release"), &executor, &mut Vec::new()).unwrap();
    let commands = executor.commands();
    assert_eq!(commands.first().unwrap(), "git rev-parse HEAD");
    assert_eq!(commands.last().unwrap(), "echo abc123");
}

#[test]
fn test_computed_variable_reached_through_default() {
    let executor = RecordingExecutor::new().stdout("git rev-parse HEAD", "abc123\n");
    app().run_with(&request("tag"), &executor, &mut Vec::new()).unwrap();
    assert_eq!(executor.commands(), vec!["git rev-parse HEAD", "git tag vabc123"]);
}

#[test]
fn test_dry_run_executes_nothing() {
    let executor = RecordingExecutor::new();
    let mut req = request("install");
    req.dry_run = true;

    let mut out = Vec::new();
    let code = app().run_with(&req, &executor, &mut out).unwrap();

    assert_eq!(code, 0);
    assert!(executor.commands().is_empty());
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("venv:\n"));
    assert!(text.contains("python3 -m venv venv"));
    assert!(text.contains("install:\n"));
}

#[test]
fn test_help_output_is_stable() {
    let app = app();
    let executor = RecordingExecutor::new();

    let mut first = Vec::new();
    let mut second = Vec::new();
    app.run_with(&request("help"), &executor, &mut first).unwrap();
    app.run_with(&request("help"), &executor, &mut second).unwrap();

    assert!(executor.commands().is_empty());
    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(first).unwrap(),
        "help     Show this help\n\
         install  Install the package\n\
         test     Run the tests\n\
         venv     Create the virtualenv\n"
    );
}

#[test]
fn test_engine_with_registry_from_targets() {
    use rmk::runner::{Action, Step, Target};

    let build = Target {
        name: "build".to_string(),
        description: None,
        prerequisites: vec![],
        guard: vec![],
        action: Action::Steps(vec![Step::new("make ${MODE}")]),
    };

    let registry = Registry::from_targets(vec![build]).unwrap();
    let executor = RecordingExecutor::new();
    let ctx = Context::new().with_verbosity(Verbosity::Silent);
    let vars = Variables::from_pairs([("MODE", "release")]);

    let result = Engine::new(&registry, &executor, &ctx)
        .run(plan("build", &registry).unwrap(), &vars, &mut Vec::new())
        .unwrap();

    assert!(result.success());
    assert_eq!(result.executed, vec!["build"]);
    assert_eq!(executor.commands(), vec!["make release"]);
}
