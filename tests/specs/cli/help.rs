//! Help and usage specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.vigil()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("check")
        .stdout_has("status")
        .stdout_has("daemon");
}

#[test]
fn no_arguments_shows_usage() {
    let temp = Project::empty();

    temp.vigil().args(&[]).fails().stderr_has("Usage:");
}

#[test]
fn check_requires_config_argument() {
    let temp = Project::empty();

    temp.vigil()
        .args(&["check"])
        .fails()
        .stderr_has("<CONFIG>");
}

#[test]
fn completions_generate_for_bash() {
    let temp = Project::empty();

    temp.vigil()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("vigil");
}
