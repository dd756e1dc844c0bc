// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP probe: response time and status of a single request

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use vigil_core::{Failure, Outcome, Worker};

pub const STATE_OK: i32 = 0;
pub const STATE_WARNING_TIME: i32 = 1;
pub const STATE_CRITICAL_TIME: i32 = 2;
pub const STATE_CRITICAL_STATUS: i32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Head => write!(f, "HEAD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpWorkerConfig {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_warning", with = "humantime_serde")]
    pub warning_after: Duration,
    #[serde(default = "default_critical", with = "humantime_serde")]
    pub critical_after: Duration,
    /// Transport timeout; a request that exceeds it fails with kind `timeout`
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_warning() -> Duration {
    Duration::from_secs(30)
}

fn default_critical() -> Duration {
    Duration::from_secs(120)
}

impl HttpWorkerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::default(),
            warning_after: default_warning(),
            critical_after: default_critical(),
            timeout: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpWorker {
    config: HttpWorkerConfig,
}

impl HttpWorker {
    pub fn new(config: HttpWorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HttpWorkerConfig {
        &self.config
    }

    /// Blocking request; run on the blocking pool
    fn probe(config: &HttpWorkerConfig, description: String) -> Result<Outcome, Failure> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .into();

        let start = Instant::now();
        let response = match config.method {
            HttpMethod::Get => agent.get(&config.url).call(),
            HttpMethod::Head => agent.head(&config.url).call(),
        }
        .map_err(|e| transport_failure(&config.url, e))?;
        let elapsed = start.elapsed();

        let status = response.status();
        let secs = elapsed.as_secs_f64();
        let at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let reason = status.canonical_reason().unwrap_or("");

        let outcome = if status.is_client_error() || status.is_server_error() {
            Outcome::critical(STATE_CRITICAL_STATUS).with_detailed_message(format!(
                "CRITICAL: Response was {} {} after {:.2} seconds @ {}.",
                status.as_u16(),
                reason,
                secs,
                at
            ))
        } else if elapsed >= config.critical_after {
            Outcome::critical(STATE_CRITICAL_TIME).with_detailed_message(format!(
                "CRITICAL: Response time was {:.2} seconds @ {}.",
                secs, at
            ))
        } else if elapsed >= config.warning_after {
            Outcome::warning(STATE_WARNING_TIME).with_detailed_message(format!(
                "Warning: Response time was {:.2} seconds @ {}.",
                secs, at
            ))
        } else {
            Outcome::ok(STATE_OK).with_detailed_message(format!(
                "OK: Response time was {:.2} seconds @ {}.",
                secs, at
            ))
        };
        Ok(outcome.with_short_message(description))
    }
}

fn transport_failure(url: &str, err: ureq::Error) -> Failure {
    let timed_out = match &err {
        ureq::Error::Timeout(_) => true,
        ureq::Error::Io(io) => io.kind() == std::io::ErrorKind::TimedOut,
        _ => false,
    };
    let message = format!("{} {}", url, err);
    if timed_out {
        Failure::timeout(message)
    } else {
        Failure::new("http", message)
    }
}

#[async_trait]
impl Worker for HttpWorker {
    fn description(&self) -> String {
        self.config
            .description
            .clone()
            .unwrap_or_else(|| format!("HTTP {} {}", self.config.method, self.config.url))
    }

    async fn run(&self) -> Result<Outcome, Failure> {
        let config = self.config.clone();
        let description = self.description();
        tokio::task::spawn_blocking(move || Self::probe(&config, description))
            .await
            .map_err(|e| Failure::new("http", format!("probe task failed: {}", e)))?
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
