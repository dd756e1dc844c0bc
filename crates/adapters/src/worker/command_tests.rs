// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vigil_core::Severity;
use yare::parameterized;

#[parameterized(
    ok = { 0, Severity::Ok },
    warning = { 1, Severity::Warning },
    critical = { 2, Severity::Critical },
    unknown = { 3, Severity::Critical },
    odd = { 42, Severity::Critical },
)]
fn exit_codes_map_to_severity(code: i32, severity: Severity) {
    let outcome = outcome_for_exit(code);
    assert_eq!(outcome.severity, severity);
    assert_eq!(outcome.state, code);
}

#[tokio::test]
async fn captures_stdout_as_detail() {
    let worker = CommandWorker::new(CommandConfig::new("echo replica lag 3s"));
    let outcome = worker.run().await.unwrap();

    assert_eq!(outcome.severity, Severity::Ok);
    assert_eq!(outcome.detailed_message, "replica lag 3s");
    assert_eq!(outcome.short_message, "Command `echo replica lag 3s`");
}

#[tokio::test]
async fn falls_back_to_stderr() {
    let worker = CommandWorker::new(CommandConfig::new("echo disk full >&2; exit 2"));
    let outcome = worker.run().await.unwrap();

    assert_eq!(outcome.severity, Severity::Critical);
    assert_eq!(outcome.state, 2);
    assert_eq!(outcome.detailed_message, "disk full");
}

#[tokio::test]
async fn unusual_exit_code_becomes_state() {
    let worker = CommandWorker::new(CommandConfig::new("exit 7"));
    let outcome = worker.run().await.unwrap();
    assert_eq!(outcome.severity, Severity::Critical);
    assert_eq!(outcome.state, 7);
}

#[tokio::test]
async fn timeout_is_a_failure() {
    let mut config = CommandConfig::new("sleep 5");
    config.timeout = Some(Duration::from_millis(100));
    let failure = CommandWorker::new(config).run().await.unwrap_err();

    assert_eq!(failure.kind, "timeout");
    assert!(failure.message.contains("sleep 5"));
}

#[tokio::test]
async fn runs_in_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker"), "present").unwrap();
    let mut config = CommandConfig::new("cat marker");
    config.cwd = Some(dir.path().to_path_buf());

    let outcome = CommandWorker::new(config).run().await.unwrap();
    assert_eq!(outcome.detailed_message, "present");
}

#[tokio::test]
async fn missing_directory_is_an_io_failure() {
    let mut config = CommandConfig::new("true");
    config.cwd = Some(PathBuf::from("/definitely/not/here"));
    let failure = CommandWorker::new(config).run().await.unwrap_err();
    assert_eq!(failure.kind, "io");
}

#[test]
fn long_output_is_truncated_on_char_boundary() {
    let text = "é".repeat(MAX_OUTPUT);
    let truncated = truncate(text);
    assert!(truncated.len() <= MAX_OUTPUT);
    assert!(truncated.chars().all(|c| c == 'é'));
}
