// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete notifiers and their configuration

mod log;
mod smtp;

pub use log::{LogNotifier, TARGET as LOG_TARGET};
pub use smtp::{Rendered, SmtpConfig, SmtpError, SmtpNotifier, DEFAULT_BODY, DEFAULT_SUBJECT};

use crate::traced::TracedNotifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vigil_core::{Notifier, Severity, SeverityFilter, SeverityMask};

/// Notifier variants, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifierKind {
    Smtp(SmtpConfig),
    Log,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(flatten)]
    pub kind: NotifierKind,
    /// Severities to deliver. E-mail defaults to warning and worse, the log
    /// to everything.
    #[serde(default)]
    pub severities: Option<Vec<Severity>>,
}

impl NotifierConfig {
    pub fn mask(&self) -> SeverityMask {
        match (&self.severities, &self.kind) {
            (Some(list), _) => list.iter().copied().collect(),
            (None, NotifierKind::Smtp(_)) => SeverityMask::WARNING_AND_CRITICAL,
            (None, NotifierKind::Log) => SeverityMask::ALL,
        }
    }

    /// Build the notifier, filtered by severity and traced
    pub fn build(&self) -> Result<Arc<dyn Notifier>, SmtpError> {
        let mask = self.mask();
        Ok(match &self.kind {
            NotifierKind::Smtp(config) => finish(SmtpNotifier::new(config.clone())?, mask),
            NotifierKind::Log => finish(LogNotifier::new(), mask),
        })
    }
}

fn finish<N: Notifier>(notifier: N, mask: SeverityMask) -> Arc<dyn Notifier> {
    Arc::new(TracedNotifier::new(SeverityFilter::new(notifier, mask)))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
