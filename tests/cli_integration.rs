//! CLI integration tests for makemend.
//!
//! These tests verify the full workflow over a small Makefile tree.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the makemend binary command.
fn makemend() -> Command {
    Command::cargo_bin("makemend").unwrap()
}

/// Create a temporary directory for test trees.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// A two-directory tree with a shared variable and shared targets.
fn fixture_tree() -> TempDir {
    let tmp = temp_dir();
    write(
        tmp.path(),
        "crypto/Makefile",
        "TOP= ..\nCFLAG= -O2\nINCLUDE= -I. -I$(TOP) -I../include\n\nall:\n\techo crypto\n\nclean:\n\trm -f *.o\n",
    );
    write(
        tmp.path(),
        "ssl/Makefile",
        "TOP= ..\nCFLAG= -O3\n\nall:\n\techo ssl\n\nclean:\n\trm -f *.o\n",
    );
    write(
        tmp.path(),
        "makemend.toml",
        "strip_variables = [\"TOP\"]\nemit_suffix_rules = true\n",
    );
    tmp
}

// ============================================================================
// makemend --report
// ============================================================================

#[test]
fn test_report_lists_common_names() {
    let tmp = fixture_tree();

    makemend()
        .args(["--report"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("CFLAG"))
        .stdout(predicate::str::contains("crypto/Makefile"))
        .stdout(predicate::str::contains("clean"));

    // Reporting never rewrites.
    let crypto = fs::read_to_string(tmp.path().join("crypto/Makefile")).unwrap();
    assert!(crypto.contains("CFLAG= -O2\n"));
}

// ============================================================================
// makemend --dump
// ============================================================================

#[test]
fn test_dump_prints_model() {
    let tmp = fixture_tree();

    makemend()
        .args(["--dump", "crypto/Makefile"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Variables: 3"))
        .stdout(predicate::str::contains("CFLAG = -O2"))
        .stdout(predicate::str::contains("all:"));
}

#[test]
fn test_dump_rejects_conflicting_structure() {
    let tmp = temp_dir();
    write(tmp.path(), "weird/Makefile", "PATH:=value\n");

    makemend()
        .args(["--dump", "weird/Makefile"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ============================================================================
// makemend (update)
// ============================================================================

#[test]
fn test_update_rewrites_tree() {
    let tmp = fixture_tree();

    makemend().current_dir(tmp.path()).assert().success();

    let crypto = fs::read_to_string(tmp.path().join("crypto/Makefile")).unwrap();
    assert!(crypto.contains("CFLAG_crypto= -O2\n"));
    assert!(crypto.contains("INCLUDE= -Icrypto -I. -Iinclude\n"));
    assert!(!crypto.contains("TOP= ..\n"));
    assert!(crypto.contains("# DO NOT DELETE THIS LINE -- generated rules follow.\n"));

    let ssl = fs::read_to_string(tmp.path().join("ssl/Makefile")).unwrap();
    assert!(ssl.contains("CFLAG_ssl= -O3\n"));

    // Wrapper files appear next to each Makefile.
    let gnu = fs::read_to_string(tmp.path().join("crypto/GNUmakefile")).unwrap();
    assert!(gnu.contains("TOP= .."));
    assert!(gnu.contains("include Makefile"));
    assert!(tmp.path().join("ssl/BSDmakefile").exists());
}

#[test]
fn test_update_is_idempotent() {
    let tmp = fixture_tree();

    makemend().current_dir(tmp.path()).assert().success();
    let crypto = fs::read_to_string(tmp.path().join("crypto/Makefile")).unwrap();
    let ssl = fs::read_to_string(tmp.path().join("ssl/Makefile")).unwrap();

    makemend().current_dir(tmp.path()).assert().success();
    assert_eq!(
        fs::read_to_string(tmp.path().join("crypto/Makefile")).unwrap(),
        crypto
    );
    assert_eq!(fs::read_to_string(tmp.path().join("ssl/Makefile")).unwrap(), ssl);
}

#[test]
fn test_update_empty_tree_fails() {
    let tmp = temp_dir();

    makemend()
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Makefiles found"));
}
