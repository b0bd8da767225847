//! Shared test utilities for integration tests
//!
//! Provides the project fixture and an isolated `ingest` command used
//! across the CLI tests.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::prelude::*;

/// A small project: two Rust files, a Go file, a log and a vendored dir.
pub fn make_project() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child("proj/src/main.rs")
        .write_str("fn main() {\n    println!(\"hi\");\n}\n")
        .expect("write main");
    tmp.child("proj/src/lib.rs")
        .write_str("pub fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n")
        .expect("write lib");
    tmp.child("proj/cmd/tool.go")
        .write_str("package main\n\nfunc main() {\n\tprintln(\"x\")\n}\n")
        .expect("write go");
    tmp.child("proj/build.log")
        .write_str("noise\n")
        .expect("write log");
    tmp.child("proj/node_modules/pkg/index.js")
        .write_str("module.exports = 1;\n")
        .expect("write js");

    tmp
}

/// `ingest` running in `dir` with a private HOME and no `INGEST_*`
/// overrides, so user config and pattern files never leak in.
pub fn ingest(dir: &std::path::Path) -> Command
{
    let mut cmd = Command::cargo_bin("ingest").expect("bin");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars()
    {
        if key.starts_with("INGEST_")
        {
            cmd.env_remove(key);
        }
    }
    cmd
}
