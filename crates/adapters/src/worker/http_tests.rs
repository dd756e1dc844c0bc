// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use vigil_core::Severity;

/// Serve a single canned response on an ephemeral port
fn serve_once(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = stream;
            let _ = write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                status_line
            );
        }
    });
    format!("http://{}/health", addr)
}

/// A port with nothing listening on it
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

#[tokio::test]
async fn fast_success_is_ok() {
    let worker = HttpWorker::new(HttpWorkerConfig::new(serve_once("200 OK")));
    let outcome = worker.run().await.unwrap();

    assert_eq!(outcome.severity, Severity::Ok);
    assert_eq!(outcome.state, STATE_OK);
    assert!(outcome.detailed_message.starts_with("OK: Response time was"));
    assert!(outcome.short_message.starts_with("HTTP GET http://127.0.0.1:"));
}

#[tokio::test]
async fn error_status_is_critical() {
    let worker = HttpWorker::new(HttpWorkerConfig::new(serve_once("503 Service Unavailable")));
    let outcome = worker.run().await.unwrap();

    assert_eq!(outcome.severity, Severity::Critical);
    assert_eq!(outcome.state, STATE_CRITICAL_STATUS);
    assert!(outcome.detailed_message.contains("503"));
}

#[tokio::test]
async fn slow_response_crosses_thresholds() {
    let mut config = HttpWorkerConfig::new(serve_once("200 OK"));
    config.warning_after = Duration::ZERO;
    let outcome = HttpWorker::new(config).run().await.unwrap();
    assert_eq!(outcome.severity, Severity::Warning);
    assert_eq!(outcome.state, STATE_WARNING_TIME);

    let mut config = HttpWorkerConfig::new(serve_once("200 OK"));
    config.warning_after = Duration::ZERO;
    config.critical_after = Duration::ZERO;
    let outcome = HttpWorker::new(config).run().await.unwrap();
    assert_eq!(outcome.severity, Severity::Critical);
    assert_eq!(outcome.state, STATE_CRITICAL_TIME);
}

#[tokio::test]
async fn connection_refused_is_a_failure() {
    let worker = HttpWorker::new(HttpWorkerConfig::new(closed_port_url()));
    let failure = worker.run().await.unwrap_err();
    assert_eq!(failure.kind, "http");
    assert!(failure.message.contains("127.0.0.1"));
}

#[test]
fn description_override() {
    let mut config = HttpWorkerConfig::new("http://example.test/");
    assert_eq!(HttpWorker::new(config.clone()).description(), "HTTP GET http://example.test/");
    config.description = Some("homepage".to_string());
    assert_eq!(HttpWorker::new(config).description(), "homepage");
}

#[test]
fn config_defaults_from_toml() {
    let config: HttpWorkerConfig = toml::from_str(
        r#"
        url = "http://example.test/"
        method = "HEAD"
        warning_after = "5s"
        timeout = "10s"
        "#,
    )
    .unwrap();
    assert_eq!(config.method, HttpMethod::Head);
    assert_eq!(config.warning_after, Duration::from_secs(5));
    assert_eq!(config.critical_after, Duration::from_secs(120));
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
}
