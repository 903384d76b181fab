//! Basic functionality integration tests for cpm CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, into_dir, pattern};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

#[test]
fn test_basic_file_copy() {
    let fx = TestFixture::new();
    let src = fx.src_file("test.txt", "hello world");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(&src)
        .arg(fx.dst.path().join("test.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 1 files"));

    fx.assert_file_content(&fx.dst.path().join("test.txt"), "hello world");
}

#[test]
fn test_file_into_directory_with_trailing_separator() {
    let fx = TestFixture::new();
    let src = fx.src_file("report.csv", "a,b,c");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(&src)
        .arg(into_dir(fx.dst.path()))
        .assert()
        .success();

    fx.assert_file_content(&fx.dst.path().join("report.csv"), "a,b,c");
}

#[test]
fn test_directory_copy() {
    let fx = TestFixture::new();
    fx.create_nested_structure(3, 2);
    fs::create_dir(fx.src.path().join("empty")).unwrap();

    let target = fx.dst.path().join("copied");
    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(fx.src.path()).arg(&target).assert().success();

    assert_eq!(fx.count_files_recursive(&target), 6);
    assert!(target.join("empty").is_dir());
    fx.assert_file_content(
        &target.join("level0/level1/level2/file1.txt"),
        "content at level 2",
    );
}

#[test]
fn test_directory_into_directory_with_trailing_separator() {
    let fx = TestFixture::new();
    fx.src_file("a.txt", "a");
    let name = fx.src.path().file_name().unwrap().to_owned();

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(fx.src.path())
        .arg(into_dir(fx.dst.path()))
        .assert()
        .success();

    fx.assert_file_content(&fx.dst.path().join(name).join("a.txt"), "a");
}

#[test]
fn test_large_file_is_byte_identical() {
    let fx = TestFixture::new();
    let data = pattern(21 * 1024 * 1024 + 17);
    let src = fx.src_file("big.bin", &data);

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("--no-sync")
        .arg("-j")
        .arg("3")
        .arg(&src)
        .arg(fx.dst.path().join("big.bin"))
        .assert()
        .success();

    assert!(fs::read(fx.dst.path().join("big.bin")).unwrap() == data);
}

#[test]
fn test_empty_file_copy() {
    let fx = TestFixture::new();
    let src = fx.src_file("empty", "");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg(&src)
        .arg(fx.dst.path().join("empty"))
        .assert()
        .success();

    assert_eq!(fs::metadata(fx.dst.path().join("empty")).unwrap().len(), 0);
}

#[test]
fn test_verbose_output() {
    let fx = TestFixture::new();
    let src = fx.src_file("v.txt", "verbose");

    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("-v")
        .arg(&src)
        .arg(fx.dst.path().join("v.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Files copied:   1"))
        .stdout(predicate::str::contains("Copy completed"));
}

#[test]
fn test_json_output() {
    let fx = TestFixture::new();
    fx.src_file("one.txt", "1");
    fx.src_file("sub/two.txt", "22");

    let mut cmd = cargo_bin_cmd!("cpm");
    let output = cmd
        .arg("--output")
        .arg("json")
        .arg(fx.src.path())
        .arg(fx.dst.path().join("out"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "completed");
    assert_eq!(value["files_copied"], 2);
    assert_eq!(value["bytes_copied"], 3);
    assert_eq!(value["dirs_created"], 2);
    assert_eq!(value["conflict_policy"], "rename");
    assert_eq!(value["failures"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_help() {
    let mut cmd = cargo_bin_cmd!("cpm");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--on-conflict"));
}
