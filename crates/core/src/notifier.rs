// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier contract: delivery of an [`Outcome`] to a recipient

use crate::outcome::{Outcome, SeverityMask};
use async_trait::async_trait;
use thiserror::Error;

/// Errors a notifier may report. The job logs these and moves on.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("template error: {0}")]
    Template(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivers outcomes to a human or another system
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Short name for logs
    fn name(&self) -> String;

    async fn notify(&self, job: &str, outcome: &Outcome) -> Result<(), NotifyError>;
}

/// Drops outcomes whose severity is outside a mask before delegating
#[derive(Debug, Clone)]
pub struct SeverityFilter<N> {
    inner: N,
    mask: SeverityMask,
}

impl<N: Notifier> SeverityFilter<N> {
    pub fn new(inner: N, mask: SeverityMask) -> Self {
        Self { inner, mask }
    }

    pub fn mask(&self) -> SeverityMask {
        self.mask
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

#[async_trait]
impl<N: Notifier> Notifier for SeverityFilter<N> {
    fn name(&self) -> String {
        self.inner.name()
    }

    async fn notify(&self, job: &str, outcome: &Outcome) -> Result<(), NotifyError> {
        if !self.mask.contains(outcome.severity) {
            tracing::trace!(
                notifier = %self.inner.name(),
                severity = %outcome.severity,
                "outcome filtered by severity"
            );
            return Ok(());
        }
        self.inner.notify(job, outcome).await
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
