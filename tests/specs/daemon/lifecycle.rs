//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;

fn daemon_dir_has(temp: &Project, file: &str) -> bool {
    let state_dir = temp.state_path().join("daemons");
    wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_dir(&state_dir)
            .ok()
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .any(|entry| entry.path().join(file).exists())
            })
            .unwrap_or(false)
    })
}

#[test]
fn daemon_status_when_not_running() {
    let temp = Project::minimal();

    temp.vigil()
        .args(&["daemon", "status", "vigil.toml"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::minimal();

    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_twice_reports_already_running() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();

    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_details_after_start() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();

    temp.vigil()
        .args(&["daemon", "status", "vigil.toml"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has(&format!("Version: {}", env!("CARGO_PKG_VERSION")))
        .stdout_has("Protocol: 1")
        .stdout_has("Uptime:")
        .stdout_has("Jobs: 1");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();

    temp.vigil()
        .args(&["daemon", "stop", "vigil.toml"])
        .passes()
        .stdout_has("Daemon stopped");
}

#[test]
fn daemon_status_after_stop() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();
    temp.vigil()
        .args(&["daemon", "stop", "vigil.toml"])
        .passes();

    temp.vigil()
        .args(&["daemon", "status", "vigil.toml"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_stop_when_not_running() {
    let temp = Project::minimal();

    temp.vigil()
        .args(&["daemon", "stop", "vigil.toml"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_rejects_invalid_config() {
    let temp = Project::empty();
    temp.file("vigil.toml", "[manager]\nheartbeat = \"0s\"\n");

    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .fails()
        .stderr_has("heartbeat must be greater than zero");
}

#[test]
fn daemon_creates_runtime_files() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();

    assert!(daemon_dir_has(&temp, "daemon.pid"), "daemon.pid should exist");
    assert!(
        daemon_dir_has(&temp, "daemon.version"),
        "daemon.version should exist"
    );

    let has_socket = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_dir(temp.state_path())
            .ok()
            .map(|entries| {
                entries.filter_map(|e| e.ok()).any(|entry| {
                    entry
                        .path()
                        .extension()
                        .map(|ext| ext == "sock")
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    });
    assert!(has_socket, "daemon socket file should exist");
}

#[test]
fn daemon_logs_show_startup() {
    let temp = Project::minimal();
    temp.vigil()
        .args(&["daemon", "start", "vigil.toml"])
        .passes();

    let ready = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.vigil()
            .args(&["daemon", "logs", "vigil.toml"])
            .passes()
            .stdout()
            .contains("Daemon ready")
    });
    assert!(ready, "daemon log should report readiness");

    temp.vigil()
        .args(&["daemon", "logs", "vigil.toml", "--lines", "100"])
        .passes()
        .stdout_has("vigild: starting");
}

#[test]
fn daemon_start_error_log_shows_in_cli() {
    // Force the socket path past SUN_LEN so bind fails inside the daemon
    let temp = Project::minimal();
    let long_suffix =
        "this_is_a_very_long_path_segment_to_ensure_socket_path_exceeds_sun_len_limit_on_any_platform";
    let long_socket_dir = temp.state_path().join(long_suffix);
    std::fs::create_dir_all(&long_socket_dir).unwrap();

    temp.vigil()
        .env("VIGIL_SOCKET_DIR", &long_socket_dir)
        .args(&["daemon", "start", "vigil.toml"])
        .fails()
        .stderr_has("Failed to bind socket")
        .stderr_lacks("Connection timeout");
}
