//! `vigil check` specs

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn check_reports_valid_config() {
    let temp = Project::minimal();

    let run = temp
        .vigil()
        .args(&["check", "vigil.toml"])
        .passes()
        .stdout_has("Configuration OK: vigil.toml");

    assert_eq!(
        run.stdout(),
        "Configuration OK: vigil.toml\n\
         Heartbeat: 100ms\n\
         Global ignore rules: 0\n\
         Jobs: 1\n\
         \x20 echo: 1 schedule(s), 1 notifier(s), 0 ignore rule(s)\n"
    );
}

#[test]
fn check_outputs_json() {
    let temp = Project::minimal();

    temp.vigil()
        .args(&["check", "vigil.toml", "--output", "json"])
        .passes()
        .stdout_has(r#""name": "echo""#)
        .stdout_has(r#""heartbeat": "100ms""#);
}

#[test]
fn check_names_unnamed_jobs_after_worker() {
    let temp = Project::empty();
    temp.file(
        "vigil.toml",
        r#"
        [[job]]
        worker = { kind = "http", url = "http://127.0.0.1:9/health" }
        "#,
    );

    temp.vigil()
        .args(&["check", "vigil.toml"])
        .passes()
        .stdout_has("HTTP GET http://127.0.0.1:9/health: 0 schedule(s)");
}

#[test]
fn check_rejects_duplicate_job_names() {
    let temp = Project::empty();
    temp.file(
        "vigil.toml",
        r#"
        [[job]]
        name = "web"
        worker = { kind = "command", command = "true" }

        [[job]]
        name = "web"
        worker = { kind = "command", command = "true" }
        "#,
    );

    temp.vigil()
        .args(&["check", "vigil.toml"])
        .fails()
        .stderr_has("Invalid configuration in vigil.toml")
        .stderr_has("duplicate job name: web");
}

#[test]
fn check_rejects_unknown_day() {
    let temp = Project::empty();
    temp.file(
        "vigil.toml",
        r#"
        [[job]]
        name = "web"
        worker = { kind = "command", command = "true" }
        schedule = [{ kind = "fixed_interval", every = "1m", days = "caturday" }]
        "#,
    );

    temp.vigil()
        .args(&["check", "vigil.toml"])
        .fails()
        .stderr_has("unknown day of week");
}

#[test]
fn check_rejects_bad_pattern_naming_job() {
    let temp = Project::empty();
    temp.file(
        "vigil.toml",
        r#"
        [[job]]
        name = "api"
        worker = { kind = "command", command = "true" }
        ignore = [{ kind = "io", pattern = "(", max_consecutive = 2 }]
        "#,
    );

    temp.vigil()
        .args(&["check", "vigil.toml"])
        .fails()
        .stderr_has("job api:");
}

#[test]
fn check_rejects_zero_heartbeat() {
    let temp = Project::empty();
    temp.file("vigil.toml", "[manager]\nheartbeat = \"0s\"\n");

    temp.vigil()
        .args(&["check", "vigil.toml"])
        .fails()
        .stderr_has("heartbeat must be greater than zero");
}

#[test]
fn check_missing_file_fails() {
    let temp = Project::empty();

    temp.vigil()
        .args(&["check", "absent.toml"])
        .fails()
        .stderr_has("absent.toml");
}
