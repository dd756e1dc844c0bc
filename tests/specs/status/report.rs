//! `vigil status` specs

use crate::prelude::*;

#[test]
fn status_without_daemon_suggests_starting_one() {
    let temp = Project::minimal();

    temp.vigil()
        .args(&["status", "vigil.toml"])
        .fails()
        .stderr_has("Daemon not running")
        .stderr_has("vigil daemon start vigil.toml");
}

#[test]
fn status_shows_job_table() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();

    temp.vigil()
        .args(&["status", "vigil.toml"])
        .passes()
        .stdout_has("JOB")
        .stdout_has("STATUS")
        .stdout_has("echo");
}

#[test]
fn status_reports_result_after_job_runs() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();

    let ran = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.vigil()
            .args(&["status", "vigil.toml"])
            .passes()
            .stdout()
            .contains("all good")
    });
    assert!(ran, "job result should appear in status");

    temp.vigil()
        .args(&["status", "vigil.toml", "--output", "json"])
        .passes()
        .stdout_has(r#""severity": "ok""#);
}
