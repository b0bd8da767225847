use assert_fs::prelude::*;
use predicates::prelude::*;

mod util;
use util::{ingest, make_project};

#[test]
fn pack_prints_prompt_to_stdout() {
    let tmp = make_project();

    let out = ingest(tmp.path())
        .args(["--quiet", "pack", "proj", "--no-clipboard", "--no-tokens"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let prompt = String::from_utf8(out).expect("utf8");

    assert!(prompt.starts_with("Project Path: "));
    assert!(prompt.contains("├── src/"));
    assert!(prompt.contains("build.log ❌"));
    assert!(prompt.contains("node_modules/ ❌"));
    assert!(prompt.contains("src/main.rs:`\n\n```rs\nfn main() {"));
    assert!(prompt.contains("pub fn add(a: i32, b: i32) -> i32"));
    assert!(!prompt.contains("module.exports"));
    assert!(!prompt.contains("noise"));
}

#[test]
fn pack_relative_paths_and_line_numbers() {
    let tmp = make_project();

    ingest(tmp.path())
        .args([
            "--quiet",
            "pack",
            "proj",
            "--no-clipboard",
            "--no-tokens",
            "--relative-paths",
            "-l",
            "-i",
            "**/*.rs",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("`proj/src/lib.rs:`"))
        .stdout(predicate::str::contains("   1 | pub fn add"))
        .stdout(predicate::str::contains("tool.go:`").not());
}

#[test]
fn pack_compress_outlines_supported_files() {
    let tmp = make_project();

    ingest(tmp.path())
        .args(["--quiet", "pack", "proj/cmd", "--no-clipboard", "--no-tokens", "--compress"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "package main\n// -----\nfunc main() { ... }\n// -----\n",
        ))
        .stdout(predicate::str::contains("println").not());
}

#[test]
fn pack_json_document() {
    let tmp = make_project();

    let out = ingest(tmp.path())
        .args(["--quiet", "pack", "proj/src", "--json", "-c", "cl100k"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert!(doc["prompt"].as_str().is_some_and(|p| p.contains("fn main()")));
    assert!(doc["token_count"].as_u64().is_some_and(|n| n > 0));
    assert_eq!(doc["files"].as_array().map(Vec::len), Some(2));
    assert!(doc["model_info"].as_str().is_some_and(|m| m.contains("Llama3")));
}

#[test]
fn pack_writes_output_file() {
    let tmp = make_project();

    ingest(tmp.path())
        .args(["pack", "proj/src", "--no-clipboard", "-o", "out/prompt.md"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Tokens (Approximate)"))
        .stderr(predicate::str::contains("Written to file:"));

    tmp.child("out/prompt.md")
        .assert(predicate::str::contains("fn main()"));
}

#[test]
fn pack_dry_run_writes_nothing() {
    let tmp = make_project();

    ingest(tmp.path())
        .args(["--dry-run", "pack", "proj/src", "--no-clipboard", "-o", "prompt.md"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DRY RUN: Would write"));

    tmp.child("prompt.md").assert(predicate::path::missing());
}

#[test]
fn pack_rejects_malformed_branch_pair() {
    let tmp = make_project();

    ingest(tmp.path())
        .args(["pack", "proj", "--no-clipboard", "--git-diff-branch", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "please provide exactly two branches separated by a comma",
        ));
}

#[test]
fn pack_honours_project_config() {
    let tmp = make_project();
    tmp.child("ingest.toml")
        .write_str("excludes = [\"**/lib.rs\"]\nno_clipboard = true\n")
        .expect("write config");

    ingest(tmp.path())
        .args(["--quiet", "pack", "proj/src", "--no-tokens"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib.rs ❌"))
        .stdout(predicate::str::contains("pub fn add").not());
}

#[test]
fn compress_prints_outline() {
    ingest(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
        .args(["compress", "testdata/example.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("def my_function(x, y): { ... } # Body removed"));
}

#[test]
fn compress_rejects_unknown_extension() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("notes.txt").write_str("hello\n").expect("write");

    ingest(tmp.path())
        .args(["compress", "notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file extension"));
}

#[test]
fn excludes_builtin_lists_defaults() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    ingest(tmp.path())
        .args(["excludes", "--builtin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**/node_modules/**"));
}

#[test]
fn excludes_user_default_replaces_builtins() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child(".config/ingest/patterns/exclude/default.glob")
        .write_str("# mine\n**/only_this/**\n")
        .expect("write glob");

    ingest(tmp.path())
        .arg("excludes")
        .assert()
        .success()
        .stdout(predicate::eq("**/only_this/**\n"));
}

#[test]
fn template_prints_builtin() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    ingest(tmp.path())
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Project Path: {{ absolute_code_path }}"));
}

#[test]
fn init_refuses_to_overwrite() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    ingest(tmp.path()).arg("init").assert().success();
    tmp.child("ingest.toml")
        .assert(predicate::str::contains("encoding = \"o200k\""));

    ingest(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    ingest(tmp.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn compress_walks_directories() {
    let tmp = make_project();

    ingest(tmp.path())
        .args(["compress", "proj"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tool.go <=="))
        .stdout(predicate::str::contains("main.rs <=="))
        .stdout(predicate::str::contains("build.log").not())
        .stdout(predicate::str::contains("index.js").not());
}

#[test]
fn pack_no_ignore_includes_gitignored_files() {
    let tmp = make_project();
    tmp.child("proj/.gitignore")
        .write_str("secret.txt\n")
        .expect("write gitignore");
    tmp.child("proj/secret.txt")
        .write_str("hidden value\n")
        .expect("write secret");

    ingest(tmp.path())
        .args(["--quiet", "pack", "proj", "--no-clipboard", "--no-tokens"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden value").not());

    ingest(tmp.path())
        .args(["--quiet", "pack", "proj", "--no-clipboard", "--no-tokens", "--no-ignore"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden value"));
}
