// Imports used by all tests in this file
use assert_cmd::prelude::*;
use std::process::Command;
// Hermetic on-disk fixtures
use assert_fs::prelude::*;
use predicates::prelude::*;

mod util;
use util::{make_project, read_doc};

fn deepbase(target: &std::path::Path, out: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("deepbase").expect("bin");
    cmd.arg(target).arg("-o").arg(out).arg("--quiet");
    cmd
}

// Default mode: header and annotated tree, no file sections.
#[test]
fn tree_only_run_lists_significant_files() {
    let tmp = make_project();
    let out = tmp.child("ctx.md");

    deepbase(tmp.path(), out.path()).assert().success();

    let doc = read_doc(out.path());
    assert!(doc.starts_with("# Project Context: "));
    assert!(doc.contains("### PROJECT STRUCTURE ###"));
    assert!(doc.contains("store.py ("));
    assert!(doc.contains("README.md ("));
    assert!(doc.contains("~"));
    assert!(!doc.contains("--- START OF FILE"));
    assert!(!doc.contains("--- SKELETON"));
}

// Ignored directories and non-significant files never appear.
#[test]
fn ignored_and_insignificant_files_are_absent() {
    let tmp = make_project();
    let out = tmp.child("ctx.md");

    deepbase(tmp.path(), out.path()).arg("--all").assert().success();

    let doc = read_doc(out.path());
    assert!(!doc.contains("node_modules"));
    assert!(!doc.contains("module.exports"));
    assert!(!doc.contains("logo.png"));
}

// Header, structure and contents appear once each, in that order.
#[test]
fn sections_are_ordered() {
    let tmp = make_project();
    let out = tmp.child("ctx.md");

    deepbase(tmp.path(), out.path()).arg("--all").assert().success();

    let doc = read_doc(out.path());
    let header = doc.find("# Project Context:").expect("header");
    let structure = doc.find("### PROJECT STRUCTURE ###").expect("structure");
    let contents = doc.find("### FILE CONTENTS ###").expect("contents");

    assert!(header < structure && structure < contents);
    assert_eq!(doc.matches("### PROJECT STRUCTURE ###").count(), 1);
    assert_eq!(doc.matches("### FILE CONTENTS ###").count(), 1);
}

// Full mode reproduces file content verbatim between markers.
#[test]
fn full_mode_includes_raw_content() {
    let tmp = make_project();
    let out = tmp.child("ctx.md");

    deepbase(tmp.path(), out.path()).arg("-a").assert().success();

    let doc = read_doc(out.path());
    assert!(doc.contains("--- START OF FILE: app/store.py ---"));
    assert!(doc.contains("--- END OF FILE: app/store.py ---"));
    assert!(doc.contains("secret = 42"));
    assert!(doc.contains("el.innerHTML = 'x';"));
}

// The output document inside the target is never scanned into itself.
#[test]
fn output_is_excluded_from_scan() {
    let tmp = make_project();
    let out = tmp.child("llm_context.md");

    deepbase(tmp.path(), out.path()).arg("-a").assert().success();
    deepbase(tmp.path(), out.path()).arg("-a").assert().success();

    let doc = read_doc(out.path());
    assert!(!doc.contains("llm_context.md"));
    assert_eq!(doc.matches("# Project Context:").count(), 1);
}

// Config file extends ignore and significance sets.
#[test]
fn config_file_is_honoured() {
    let tmp = make_project();
    tmp.child(".deepbase.toml")
        .write_str(
            "ignore_dirs = [\"web\"]\n\
             ignore_files = [\"README.md\"]\n\
             significant_extensions = [\".proto\"]\n",
        )
        .expect("write config");
    tmp.child("api/service.proto")
        .write_str("syntax = \"proto3\";\n")
        .expect("write proto");
    let out = tmp.child("ctx.md");

    deepbase(tmp.path(), out.path()).arg("-a").assert().success();

    let doc = read_doc(out.path());
    assert!(!doc.contains("index.js"));
    assert!(!doc.contains("README.md"));
    assert!(!doc.contains(".deepbase.toml"));
    assert!(doc.contains("--- START OF FILE: api/service.proto ---"));
}

// A malformed config falls back to defaults instead of failing.
#[test]
fn malformed_config_uses_defaults() {
    let tmp = make_project();
    tmp.child(".deepbase.toml")
        .write_str("ignore_dirs = [unterminated\n")
        .expect("write config");
    let out = tmp.child("ctx.md");

    deepbase(tmp.path(), out.path()).assert().success();

    assert!(read_doc(out.path()).contains("store.py ("));
}

// Success summary is printed unless --quiet.
#[test]
fn summary_reports_output_path() {
    let tmp = make_project();
    let out = tmp.child("ctx.md");

    Command::cargo_bin("deepbase")
        .expect("bin")
        .arg(tmp.path())
        .arg("-o")
        .arg(out.path())
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ SUCCESS: Context created in"))
        .stdout(predicate::str::contains("tokens"));

    deepbase(tmp.path(), out.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
