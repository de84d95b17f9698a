//! CLI tests for `venv-setup`.
//!
//! Spawns the binary with `PATH` pointing only at fake python/pip scripts and
//! verifies exit codes and the saved config.

#![cfg(unix)]

use std::fs;
use std::process::{Command, Output};

use serde_json::{Value, json};
use venv_setup::exit_codes;
use venv_setup::test_support::TestProject;

fn venv_setup(project: &TestProject, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_venv-setup"))
        .current_dir(project.path())
        .env("PATH", project.bin_dir())
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("run venv-setup")
}

fn saved(project: &TestProject) -> Value {
    let raw = fs::read_to_string(project.path().join(".python_venv_config.json"))
        .expect("read saved config");
    serde_json::from_str(&raw).expect("parse saved config")
}

#[test]
fn install_falls_back_to_default_pair() {
    let project = TestProject::with_section(json!({ "pythonExecFallback": true })).expect("project");
    project.fake_executable("python", 0, 0).expect("python");
    project.fake_executable("pip", 0, 0).expect("pip");

    let output = venv_setup(&project, &["install"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Using python for python and pip for pip"));
    let saved = saved(&project);
    assert_eq!(saved["pythonExecName"], "python");
    assert_eq!(saved["pipExecName"], "pip");
}

#[test]
fn failing_custom_python_without_fallback_exits_no_interpreter() {
    let project = TestProject::with_section(json!({
        "pythonExecName": "foo",
        "pipExecName": "bar",
        "pythonExecFallback": false,
    }))
    .expect("project");
    project.fake_executable("foo", 1, 0).expect("foo");
    project.fake_executable("bar", 0, 0).expect("bar");
    project.fake_executable("python3", 0, 0).expect("python3");
    project.fake_executable("pip3", 0, 0).expect("pip3");

    let output = venv_setup(&project, &["install"]);

    assert_eq!(output.status.code(), Some(exit_codes::NO_INTERPRETER));
    assert!(String::from_utf8_lossy(&output.stderr).contains("fallback disabled"));
    assert!(!project.path().join(".python_venv_config.json").exists());
}

#[test]
fn permission_denied_exits_install_failed() {
    let project = TestProject::with_section(json!({})).expect("project");
    project.fake_executable("python3", 0, 0).expect("python3");
    project.fake_executable("pip3", 0, 2).expect("pip3");

    let output = venv_setup(&project, &["install"]);

    assert_eq!(output.status.code(), Some(exit_codes::INSTALL_FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("permission denied"));
    assert!(!project.path().join(".python_venv_config.json").exists());
}

#[test]
fn show_prints_saved_config_after_install() {
    let project = TestProject::with_section(json!({})).expect("project");
    project.fake_executable("python3", 0, 0).expect("python3");
    project.fake_executable("pip3", 0, 0).expect("pip3");

    let install = venv_setup(&project, &["install", "--venv-version", "20.0.0"]);
    assert_eq!(install.status.code(), Some(exit_codes::OK));

    let show = venv_setup(&project, &["show"]);
    assert_eq!(show.status.code(), Some(exit_codes::OK));
    let printed: Value = serde_json::from_slice(&show.stdout).expect("json");
    assert_eq!(printed["pythonExecName"], "python3");
    assert_eq!(printed["venvVersion"], "20.0.0");
}

#[test]
fn show_without_saved_config_is_invalid() {
    let project = TestProject::with_section(json!({})).expect("project");

    let output = venv_setup(&project, &["show"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn resolve_prints_pair() {
    let project = TestProject::with_section(json!({})).expect("project");
    project.fake_executable("python3", 0, 0).expect("python3");
    project.fake_executable("pip3", 0, 0).expect("pip3");

    let output = venv_setup(&project, &["resolve"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "python=python3 pip=pip3"
    );
    assert!(!project.path().join(".python_venv_config.json").exists());
}
