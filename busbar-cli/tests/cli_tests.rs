//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Build command for the busbar-cli binary.
fn busbar_cli() -> Command {
    cargo_bin_cmd!("busbar-cli")
}

/// Path to busbar library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("busbar")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = busbar_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("energization"));
}

#[test]
fn test_cli_version() {
    let mut cmd = busbar_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_check_base_case() {
    let mut cmd = busbar_cli();
    let path = fixtures_dir().join("base_case.json");

    cmd.arg("check").arg(path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ENERGIZED DEVICES"))
        .stdout(predicate::str::contains("LOAD1"))
        .stdout(predicate::str::contains("w3  AC"));
}

#[test]
fn test_cli_check_json_output() {
    let mut cmd = busbar_cli();
    let path = fixtures_dir().join("conversion_chain.json");

    cmd.arg("check").arg(path).arg("--format").arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let result = &json["results"][0];
    assert_eq!(result["energization"]["conductorKinds"]["w4"], "DC");
    assert_eq!(result["energization"]["conductorKinds"]["w5"], "AC");
    assert_eq!(result["stats"]["energized_devices"], 6);
}

#[test]
fn test_cli_check_nonexistent_file() {
    let mut cmd = busbar_cli();

    cmd.arg("check").arg("does_not_exist.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_check_rejects_missing_conductors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{ "version": "busbar/1", "devices": [] }"#).unwrap();

    let mut cmd = busbar_cli();
    cmd.arg("check").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("conductors"));
}

#[test]
fn test_cli_fail_on_skipped() {
    let path = fixtures_dir().join("dangling_wire.json");

    let mut cmd = busbar_cli();
    cmd.arg("check").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SKIPPED"));

    let mut cmd = busbar_cli();
    cmd.arg("check").arg(&path).arg("--fail-on-skipped");
    cmd.assert().failure();
}

#[test]
fn test_cli_project_command() {
    let mut cmd = busbar_cli();

    cmd.arg("project").arg(fixtures_dir());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("base_case.json"))
        .stdout(predicate::str::contains("conversion_chain.json"));
}

#[test]
fn test_cli_project_ignores_unrelated_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        fixtures_dir().join("base_case.json"),
        dir.path().join("feeder.json"),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("package.json"),
        r#"{"name":"editor","version":"1.0.0"}"#,
    )
    .unwrap();

    let mut cmd = busbar_cli();
    cmd.arg("project").arg(dir.path()).arg("--format").arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["summary"]["total_files"], 1);
    assert!(json["results"][0]["file"]
        .as_str()
        .unwrap()
        .ends_with("feeder.json"));
}

#[test]
fn test_cli_query_device() {
    let path = fixtures_dir().join("base_case.json");

    let mut cmd = busbar_cli();
    cmd.arg("query").arg(&path).arg("--device").arg("LOAD1");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("LOAD1: energized"));

    let mut cmd = busbar_cli();
    cmd.arg("query").arg(&path).arg("--device").arg("NOPE");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown device"));
}

#[test]
fn test_cli_query_conductor() {
    let path = fixtures_dir().join("conversion_chain.json");

    let mut cmd = busbar_cli();
    cmd.arg("query").arg(&path).arg("--conductor").arg("w4");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("w4: energized DC"));
}

#[test]
fn test_cli_query_needs_target() {
    let mut cmd = busbar_cli();
    cmd.arg("query").arg(fixtures_dir().join("base_case.json"));
    cmd.assert().failure();
}

#[test]
fn test_cli_mixed_policy_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.json");
    std::fs::write(
        &path,
        r#"{ "version": "busbar/1",
            "devices": [
                { "id": "G", "type": "source", "signal": "AC" },
                { "id": "B", "type": "source", "signal": "DC" },
                { "id": "L", "type": "load" }
            ],
            "conductors": [
                { "id": "a", "fromDevice": "G", "fromPort": 0, "toDevice": "L", "toPort": 0 },
                { "id": "b", "fromDevice": "B", "fromPort": 0, "toDevice": "L", "toPort": 0 }
            ] }"#,
    )
    .unwrap();

    let mut cmd = busbar_cli();
    cmd.arg("query").arg(&path).arg("--conductor").arg("a");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a: energized DC"));

    let mut cmd = busbar_cli();
    cmd.arg("query")
        .arg(&path)
        .arg("--conductor")
        .arg("a")
        .arg("--mixed")
        .arg("prefer-ac");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a: energized AC"));
}

#[test]
fn test_cli_types_command() {
    let mut cmd = busbar_cli();

    cmd.arg("types").arg("--verbose");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("rectifier"))
        .stdout(predicate::str::contains("0=AC, 1=DC"));
}
