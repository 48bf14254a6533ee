//! Smoke tests for the binary's argument surface.

use assert_cmd::Command;
use predicates::prelude::*;

fn loft() -> Command {
    Command::cargo_bin("loft").expect("binary builds")
}

#[test]
fn help_lists_upgrade_command() {
    loft()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upgrade"));
}

#[test]
fn version_prints_package_version() {
    loft()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_is_rejected() {
    loft()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn verbose_and_quiet_conflict() {
    loft()
        .args(["--verbose", "--quiet", "upgrade"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn upgrade_help_documents_the_command() {
    loft()
        .args(["upgrade", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latest release"));
}
