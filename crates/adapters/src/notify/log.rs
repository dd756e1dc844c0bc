// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier that writes outcomes to the tracing log

use async_trait::async_trait;
use vigil_core::{NotifyError, Notifier, Outcome, Severity};

/// Target of every alert event
pub const TARGET: &str = "vigil::alert";

/// Emits each outcome as a tracing event, at a level following its severity
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> String {
        "log".to_string()
    }

    async fn notify(&self, job: &str, outcome: &Outcome) -> Result<(), NotifyError> {
        let short = outcome.short_message.as_str();
        let detail = outcome.detailed_message.as_str();
        match outcome.severity {
            Severity::Ok => {
                tracing::info!(target: TARGET, job, state = outcome.state, detail, "{}", short)
            }
            Severity::Warning => {
                tracing::warn!(target: TARGET, job, state = outcome.state, detail, "{}", short)
            }
            Severity::Critical | Severity::Raised => {
                tracing::error!(target: TARGET, job, state = outcome.state, severity = %outcome.severity, detail, "{}", short)
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
