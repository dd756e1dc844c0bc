// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn worker_kinds_parse_from_toml() {
    let http: WorkerConfig = toml::from_str(
        r#"
        kind = "http"
        url = "http://example.test/"
        "#,
    )
    .unwrap();
    assert!(matches!(http, WorkerConfig::Http(_)));

    let disk: WorkerConfig = toml::from_str(
        r#"
        kind = "disk_space"
        paths = ["/"]
        warning_percent_free = 15.0
        "#,
    )
    .unwrap();
    match disk {
        WorkerConfig::DiskSpace(config) => assert_eq!(config.thresholds.warning_percent_free, 15.0),
        other => panic!("unexpected {:?}", other),
    }

    let command: WorkerConfig = toml::from_str(
        r#"
        kind = "command"
        command = "true"
        timeout = "5s"
        "#,
    )
    .unwrap();
    assert!(matches!(command, WorkerConfig::Command(_)));
}

#[test]
fn unknown_kind_is_rejected() {
    let result: Result<WorkerConfig, _> = toml::from_str(r#"kind = "ftp""#);
    assert!(result.is_err());
}

#[test]
fn built_worker_keeps_description() {
    let mut config = CommandConfig::new("true");
    config.description = Some("noop".to_string());
    let worker = WorkerConfig::Command(config).build();
    assert_eq!(worker.description(), "noop");
}

#[tokio::test]
async fn built_worker_runs() {
    let worker = WorkerConfig::Command(CommandConfig::new("exit 1")).build();
    let outcome = worker.run().await.unwrap();
    assert_eq!(outcome.state, 1);
}
