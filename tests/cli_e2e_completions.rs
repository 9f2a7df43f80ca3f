//! `codetriage completions` run as a binary: each script must know about the
//! `triage` and `pull` subcommands and their flags.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("codetriage");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("powershell"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("codetriage");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_codetriage()"))
        .stdout(predicate::str::contains("triage"))
        .stdout(predicate::str::contains("pull"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("codetriage");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef codetriage"))
        .stdout(predicate::str::contains("--on-exists"));
}

#[test]
fn test_completions_fish() {
    let mut cmd = cargo_bin_cmd!("codetriage");
    cmd.arg("completions")
        .arg("fish")
        .assert()
        .success()
        .stdout(predicate::str::contains("__fish_codetriage"))
        .stdout(predicate::str::contains("triage-file"));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("codetriage");
    cmd.arg("completions")
        .arg("tcsh")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}
