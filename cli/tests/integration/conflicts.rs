//! Conflict policy integration tests for cpm CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;

#[rstest]
#[case("r")]
#[case("R")]
#[case("rename")]
fn test_rename_keeps_existing(#[case] policy: &str) {
    let fx = TestFixture::new();
    let src = fx.src_file("notes.txt", "new");
    let existing = fx.dst_file("notes.txt", "old");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("-c")
        .arg(policy)
        .arg(&src)
        .arg(&existing)
        .assert()
        .success();

    fx.assert_file_content(&existing, "old");
    fx.assert_file_content(&fx.dst.path().join("notes-1.txt"), "new");
}

#[rstest]
#[case("o")]
#[case("overwrite")]
fn test_overwrite_replaces(#[case] policy: &str) {
    let fx = TestFixture::new();
    let src = fx.src_file("notes.txt", "new");
    let existing = fx.dst_file("notes.txt", "old but longer");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("--on-conflict")
        .arg(policy)
        .arg(&src)
        .arg(&existing)
        .assert()
        .success();

    fx.assert_file_content(&existing, "new");
    assert!(!fx.dst.path().join("notes-1.txt").exists());
}

#[rstest]
#[case("i")]
#[case("ignore")]
fn test_ignore_leaves_existing(#[case] policy: &str) {
    let fx = TestFixture::new();
    let src = fx.src_file("notes.txt", "new");
    let existing = fx.dst_file("notes.txt", "old");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("-c")
        .arg(policy)
        .arg(&src)
        .arg(&existing)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files already exist"));

    fx.assert_file_content(&existing, "old");
}

#[test]
fn test_no_policy_without_terminal_renames() {
    let fx = TestFixture::new();
    let src = fx.src_file("data.bin", "new");
    let existing = fx.dst_file("data.bin", "old");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(&src).arg(&existing).write_stdin("").assert().success();

    fx.assert_file_content(&existing, "old");
    fx.assert_file_content(&fx.dst.path().join("data-1.bin"), "new");
}

#[test]
fn test_rename_skips_taken_numbers() {
    let fx = TestFixture::new();
    let src = fx.src_file("log.txt", "newest");
    let existing = fx.dst_file("log.txt", "0");
    fx.dst_file("log-1.txt", "1");
    fx.dst_file("log-2.txt", "2");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(&src).arg(&existing).assert().success();

    fx.assert_file_content(&fx.dst.path().join("log-1.txt"), "1");
    fx.assert_file_content(&fx.dst.path().join("log-2.txt"), "2");
    fx.assert_file_content(&fx.dst.path().join("log-3.txt"), "newest");
}

#[test]
fn test_directory_merge_applies_policy_to_children() {
    let fx = TestFixture::new();
    fx.src_file("same.txt", "from source");
    fx.src_file("sub/fresh.txt", "fresh");
    fx.dst_file("same.txt", "from destination");
    fx.dst_file("sub/keep.txt", "keep");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("-c")
        .arg("i")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .assert()
        .success();

    fx.assert_file_content(&fx.dst.path().join("same.txt"), "from destination");
    fx.assert_file_content(&fx.dst.path().join("sub/fresh.txt"), "fresh");
    fx.assert_file_content(&fx.dst.path().join("sub/keep.txt"), "keep");
}

#[test]
fn test_invalid_policy_is_usage_error() {
    let fx = TestFixture::new();
    let src = fx.src_file("a.txt", "a");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("-c")
        .arg("x")
        .arg(&src)
        .arg(fx.dst.path().join("a.txt"))
        .assert()
        .code(2);

    assert!(!fx.dst.path().join("a.txt").exists());
}
