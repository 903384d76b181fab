//! Error handling integration tests for cpm CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

#[test]
fn test_missing_source() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(fx.src.path().join("nonexistent"))
        .arg(fx.dst.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[source_not_found]"));

    assert!(!fx.dst.path().join("out").exists());
}

#[test]
fn test_missing_operand_is_usage_error() {
    let fx = TestFixture::new();
    let src = fx.src_file("a.txt", "a");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(&src).assert().code(2);
}

#[test]
fn test_directory_onto_existing_file() {
    let fx = TestFixture::new();
    fx.src_file("inner.txt", "inner");
    let existing = fx.dst_file("target", "precious");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("-c")
        .arg("o")
        .arg(fx.src.path())
        .arg(&existing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[destination_type_mismatch]"))
        .stderr(predicate::str::contains("Cannot copy directory to file path"));

    fx.assert_file_content(&existing, "precious");
}

#[test]
fn test_file_onto_directory_suggests_separator() {
    let fx = TestFixture::new();
    let src = fx.src_file("a.txt", "a");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(&src)
        .arg(fx.dst.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("append '/'"));

    assert!(!fx.dst.path().join("a.txt").exists());
}

#[test]
fn test_same_source_and_destination() {
    let fx = TestFixture::new();
    let src = fx.src_file("a.txt", "unchanged");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("-c")
        .arg("overwrite")
        .arg(&src)
        .arg(&src)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("same"));

    fx.assert_file_content(&src, "unchanged");
}

#[test]
fn test_failed_json_output() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("cpm");
    let output = cmd
        .arg("--output")
        .arg("json")
        .arg(fx.src.path().join("missing"))
        .arg(fx.dst.path().join("out"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "failed");
    assert_eq!(value["destination"], Value::Null);
    assert_eq!(value["failures"][0]["code"], "source_not_found");
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_partial_failure() {
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new();
    fx.src_file("ok.txt", "fine");
    let locked = fx.src_file("locked.txt", "secret");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read it anyway
    if fs::read(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let target = fx.dst.path().join("out");
    let mut cmd = cargo_bin_cmd!("cpm");
    let output = cmd
        .arg("--output")
        .arg("json")
        .arg(fx.src.path())
        .arg(&target)
        .output()
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "partially_failed");
    assert_eq!(value["files_copied"], 1);
    assert_eq!(value["failures"][0]["code"], "permission_denied");
    fx.assert_file_content(&target.join("ok.txt"), "fine");
    assert!(!target.join("locked.txt").exists());
}
