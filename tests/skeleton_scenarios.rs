//! End-to-end scenarios for skeleton mode, focus promotion and database
//! introspection.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

mod util;
use util::{PY_SAMPLE, make_corrupt_database, make_database, make_project, read_doc};

fn run_light(target: &Path, out: &Path, extra: &[&str]) -> String {
    Command::cargo_bin("deepbase")
        .expect("bin")
        .arg(target)
        .arg("-o")
        .arg(out)
        .arg("--light")
        .arg("--quiet")
        .args(extra)
        .assert()
        .success();

    read_doc(out)
}

#[test]
fn python_skeleton_keeps_signatures_only() {
    let tmp = make_project();
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &[]);

    assert!(doc.contains("> [LIGHT MODE]"));
    assert!(doc.contains("--- SKELETON: app/store.py ---"));
    assert!(doc.contains("\"\"\"Inventory helpers.\"\"\""));
    assert!(doc.contains("class Store(Base):"));
    assert!(doc.contains("    \"\"\"Keeps items.\"\"\""));
    assert!(doc.contains("    def size(self) -> int: ..."));
    assert!(doc.contains("    def add(self, item, qty = 1): ..."));
    assert!(doc.contains("async def fetch(url: str) -> bytes: ..."));

    assert!(!doc.contains("secret = 42"));
    assert!(!doc.contains("self.items.append"));
    assert!(!doc.contains("Long description."));
    assert!(!doc.contains("--- END OF FILE"));
}

#[test]
fn script_and_markdown_skeletons() {
    let tmp = make_project();
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &[]);

    assert!(doc.contains("export function render(el) { ... }"));
    assert!(!doc.contains("innerHTML"));
    assert!(doc.contains("# Demo\n## Usage"));
    assert!(!doc.contains("Intro text."));
}

#[test]
fn database_compact_schema() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    make_database(tmp.child("data/app.db").path());
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &[]);

    assert!(doc.contains("--- SKELETON: data/app.db ---"));
    assert!(doc.contains("DB: app.db"));
    assert!(doc.contains("Tables: 2 | Rows: 3"));
    assert!(doc.contains("T: users("));
    assert!(doc.contains("email:TEXT"));
    assert!(doc.contains("user_id→users.id"));
}

#[test]
fn table_focus_renders_hybrid_schema() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    make_database(tmp.child("app.db").path());
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &["--focus", "app.db/users"]);

    assert!(doc.contains("--- START OF FILE: app.db [FOCUS] ---"));
    assert!(doc.contains("### [FOCUSED] Table: `users`"));
    assert!(doc.contains("| `email` | TEXT | NOT NULL |"));
    assert!(doc.contains("T: orders("));
    assert!(!doc.contains("[FOCUSED] Table: `orders`"));
}

#[test]
fn focus_promotes_only_matching_files() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("a.py")
        .write_str("def a():\n    return 'alpha-body'\n")
        .expect("write a");
    tmp.child("b.py")
        .write_str("def b():\n    return 'beta-body'\n")
        .expect("write b");
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &["-f", "a.py"]);

    assert!(doc.contains("--- START OF FILE: a.py [FOCUS] ---"));
    assert!(doc.contains("alpha-body"));
    assert!(doc.contains("--- SKELETON: b.py ---\n\ndef b(): ..."));
    assert!(!doc.contains("beta-body"));
}

#[test]
fn focus_file_patterns_apply() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("src/a.py")
        .write_str("def a():\n    return 'alpha-body'\n")
        .expect("write a");
    let patterns = assert_fs::NamedTempFile::new("focus.txt").expect("named");
    patterns
        .write_str("# hot\nsrc/a.py\n")
        .expect("write patterns");
    let out = tmp.child("ctx.md");

    Command::cargo_bin("deepbase")
        .expect("bin")
        .arg(tmp.path())
        .arg("-o")
        .arg(out.path())
        .arg("--focus-file")
        .arg(patterns.path())
        .arg("-q")
        .assert()
        .success();

    let doc = read_doc(out.path());
    assert!(doc.contains("--- START OF FILE: src/a.py [FOCUS] ---"));
    assert!(doc.contains("alpha-body"));
}

#[test]
fn corrupt_database_does_not_stop_the_run() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    make_corrupt_database(tmp.child("broken.db").path());
    tmp.child("z.py")
        .write_str("def zed():\n    pass\n")
        .expect("write z");
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &[]);

    let marker = doc.find("[Error reading database:").expect("marker");
    let next = doc.find("def zed(): ...").expect("later file");
    assert!(marker < next);
}

#[test]
fn fallback_formats_are_reported_once() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("a.css").write_str("a { color: red; }\n").expect("css");
    tmp.child("b.css").write_str("b { color: blue; }\n").expect("css");
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &[]);

    assert_eq!(doc.matches("[WARNING] Light Mode support").count(), 1);
    assert!(doc.contains("limited for: .css."));
    assert!(doc.contains("a { color: red; }"));
}

#[test]
fn config_files_get_key_outlines() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("package.json")
        .write_str("{\"name\": \"web\", \"scripts\": {\"build\": \"vite build\"}}\n")
        .expect("json");
    tmp.child("pyproject.toml")
        .write_str("[project]\nname = \"demo\"\nversion = \"0.3.1\"\n")
        .expect("toml");
    tmp.child("Dockerfile")
        .write_str("# base image\nFROM python:3.12\nRUN pip install .\n")
        .expect("dockerfile");
    let out = tmp.child("ctx.md");

    let doc = run_light(tmp.path(), out.path(), &[]);

    assert!(doc.contains("--- SKELETON: package.json ---\n\n{\n  name: (value)\n  scripts: { ...keys: [build] }\n}"));
    assert!(doc.contains("--- SKELETON: pyproject.toml ---\n\n[project]\nname = ...\nversion = ..."));
    assert!(doc.contains("--- SKELETON: Dockerfile ---\n\nFROM python:3.12\nRUN pip install ."));
    assert!(!doc.contains("vite build"));
    assert!(!doc.contains("0.3.1"));
    assert!(!doc.contains("[WARNING] Light Mode support"));
}

#[test]
fn single_file_target_gets_skeleton() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let src = tmp.child("store.py");
    src.write_str(PY_SAMPLE).expect("write");
    let out = assert_fs::NamedTempFile::new("ctx.md").expect("named");

    Command::cargo_bin("deepbase")
        .expect("bin")
        .arg(src.path())
        .arg("-o")
        .arg(out.path())
        .arg("-q")
        .assert()
        .success();

    let doc = read_doc(out.path());
    assert!(doc.starts_with("# Project Context: store.py"));
    assert!(!doc.contains("store.py/"));
    assert!(doc.contains("--- START OF FILE: store.py ---"));
    assert!(doc.contains("class Store(Base):"));
    assert!(!doc.contains("secret = 42"));
}

#[test]
fn repeated_runs_are_identical() {
    let tmp = make_project();
    let outs = assert_fs::TempDir::new().expect("tempdir");

    let first = run_light(tmp.path(), outs.child("one.md").path(), &["-f", "README.md"]);
    let second = run_light(tmp.path(), outs.child("two.md").path(), &["-f", "README.md"]);

    assert_eq!(first, second);
}
