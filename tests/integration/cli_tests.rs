//! CLI integration tests
//!
//! These tests run the annoview binary against the fixture projects.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn annoview() -> Command {
    Command::cargo_bin("annoview").expect("binary should be built")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    annoview()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("annoview"))
        .stdout(predicate::str::contains("--site"))
        .stdout(predicate::str::contains("--find"));
}

#[test]
fn test_cli_version() {
    annoview()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("annoview"));
}

#[test]
fn test_cli_rejects_unknown_site() {
    annoview()
        .arg(fixtures_path())
        .args(["--site", "backing-field"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown site"));
}

#[test]
fn test_cli_rejects_unknown_filter() {
    annoview()
        .arg(fixtures_path())
        .args(["--filter", "everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown filter"));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_cli_terminal_getter_view() {
    annoview()
        .arg(fixtures_path())
        .args(["--decl", "displayName", "--site", "getter", "--find", "com.example.meta.Tag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("property displayName"))
        .stdout(predicate::str::contains("@get:com.example.meta.Tag(value = \"getter\")"))
        .stdout(predicate::str::contains("@field:androidx.room.ColumnInfo").not());
}

#[test]
fn test_cli_json_output() {
    let output = annoview()
        .arg(fixtures_path())
        .args([
            "--quiet",
            "--format",
            "json",
            "--decl",
            "labels",
            "--site",
            "field",
            "--find",
            "com.example.meta.Tag",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_matches"], 1);
    let found = &value["matches"][0]["found"];
    assert_eq!(found["container"], "com.example.meta.Tags");
    assert_eq!(found["instances"].as_array().unwrap().len(), 2);
}

#[test]
fn test_cli_json_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");

    annoview()
        .arg(fixtures_path())
        .args(["--quiet", "--format", "json", "--decl", "*Name", "--output"])
        .arg(&report)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&report).unwrap();
    assert!(contents.contains("\"total_matches\""));
    assert!(contents.contains("displayName"));
}

#[test]
fn test_cli_no_container() {
    annoview()
        .arg(fixtures_path())
        .args([
            "--decl",
            "labels",
            "--site",
            "field",
            "--find",
            "com.example.meta.Tag",
            "--no-container",
            "--no-arguments",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.meta.Tag: 0"));
}

#[test]
fn test_cli_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(
        src.join("Model.kt"),
        "package com.example\n\nclass Model {\n    @field:Column(\"id\")\n    \
         val id: Long = 0\n}\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join(".annoview.yml"),
        "resolution:\n  aliases:\n    Column: javax.persistence.Column\n\
         query:\n  site: field\nreport:\n  format: json\n",
    )
    .unwrap();

    let output = annoview().arg(dir.path()).arg("--quiet").output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["matches"][0]["site"], "field");
    let annotation = &value["matches"][0]["annotations"][0];
    assert_eq!(annotation["package"], "javax.persistence");
    assert_eq!(annotation["name"], "Column");
}

#[test]
fn test_cli_empty_project() {
    let dir = tempfile::tempdir().unwrap();

    annoview()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No Kotlin or Java files found."));
}
