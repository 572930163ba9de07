//! Command-line surface of the binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_session_options() {
    Command::cargo_bin("screenlog")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--interval"))
        .stdout(predicate::str::contains("--quality"))
        .stdout(predicate::str::contains("--dest"))
        .stdout(predicate::str::contains("--archive-every"))
        .stdout(predicate::str::contains("--data-dir"));
}

#[test]
fn test_zero_interval_is_rejected() {
    Command::cargo_bin("screenlog")
        .unwrap()
        .args(["--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--interval"));
}

#[test]
fn test_unknown_quality_is_rejected() {
    Command::cargo_bin("screenlog")
        .unwrap()
        .args(["--quality", "ultra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("possible values"));
}
