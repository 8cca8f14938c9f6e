//! End-to-end tests for the `expert-system` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn rule_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

fn expert_system() -> Command {
    let mut cmd = Command::cargo_bin("expert-system").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("EXPERT_SYSTEM_REASONING")
        .env_remove("EXPERT_SYSTEM_OUTPUT")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_answers_queries() {
    let file = rule_file("# simple chain\nA + B => C\nC => D\n\n=AB\n?CDE\n");

    expert_system()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("C: TRUE"))
        .stdout(predicate::str::contains("D: TRUE"))
        .stdout(predicate::str::contains("E: FALSE"));
}

#[test]
fn test_undetermined_conclusion() {
    let file = rule_file("A => B | C\n=A\n?BC\n");

    expert_system()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("B: UNDETERMINED"))
        .stdout(predicate::str::contains("C: UNDETERMINED"));
}

#[test]
fn test_parse_error_exits_with_failure() {
    let file = rule_file("A + => B\n=A\n?B\n");

    expert_system()
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn test_missing_file_exits_with_failure() {
    expert_system()
        .arg("/nonexistent/rules.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_contradiction_is_reported() {
    let file = rule_file("A => B\n=A\n!B\n?B\n");

    expert_system()
        .arg(file.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("UNRELIABLE"))
        .stdout(predicate::str::contains("B: FALSE"));
}

#[test]
fn test_json_output() {
    let file = rule_file("A | B => C\n=B\n?CA\n");

    let output = expert_system()
        .arg(file.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["results"]["C"], "TRUE");
    assert_eq!(value["results"]["A"], "FALSE");
    assert_eq!(value["reliable"], true);
}

#[test]
fn test_json_output_from_env() {
    let file = rule_file("A => B\n=A\n?B\n");

    expert_system()
        .arg(file.path())
        .env("EXPERT_SYSTEM_OUTPUT", "json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reliable\": true"));
}

#[test]
fn test_bad_output_env_is_reported() {
    let file = rule_file("A => B\n=A\n?B\n");

    expert_system()
        .arg(file.path())
        .env("EXPERT_SYSTEM_OUTPUT", "yaml")
        .assert()
        .success()
        .stdout(predicate::str::contains("B: TRUE"))
        .stderr(predicate::str::contains("Ignoring EXPERT_SYSTEM_OUTPUT"));
}

#[test]
fn test_reasoning_output() {
    let file = rule_file("A => B\n=A\n?B\n");

    expert_system()
        .arg(file.path())
        .arg("-r")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reasoning for B:"))
        .stdout(predicate::str::contains("Conclusion: B is TRUE"));
}

#[test]
fn test_interactive_json_is_rejected() {
    let file = rule_file("A => B\n=A\n?B\n");

    expert_system()
        .arg(file.path())
        .args(["-i", "--json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("interactive mode"));
}

#[test]
fn test_no_color_output_is_plain() {
    let file = rule_file("A => B\n=A\n?B\n");

    expert_system()
        .arg(file.path())
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}[").not());
}
