// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced wrappers for consistent observability

use async_trait::async_trait;
use tracing::Instrument;
use vigil_core::{Failure, NotifyError, Notifier, Outcome, Worker};

/// Wrapper that adds tracing to any Worker
#[derive(Clone)]
pub struct TracedWorker<W> {
    inner: W,
}

impl<W> TracedWorker<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<W: Worker> Worker for TracedWorker<W> {
    fn description(&self) -> String {
        self.inner.description()
    }

    async fn run(&self) -> Result<Outcome, Failure> {
        let description = self.inner.description();
        let span = tracing::info_span!("worker.run", worker = %description);

        async move {
            tracing::debug!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.run().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(outcome) => tracing::info!(
                    elapsed_ms,
                    severity = %outcome.severity,
                    state = outcome.state,
                    "check finished"
                ),
                Err(failure) => tracing::warn!(
                    elapsed_ms,
                    kind = %failure.kind,
                    error = %failure.message,
                    "check failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any Notifier
#[derive(Clone)]
pub struct TracedNotifier<N> {
    inner: N,
}

impl<N> TracedNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for TracedNotifier<N> {
    fn name(&self) -> String {
        self.inner.name()
    }

    async fn notify(&self, job: &str, outcome: &Outcome) -> Result<(), NotifyError> {
        let span = tracing::info_span!("notifier.notify", notifier = %self.inner.name(), job);

        async move {
            let start = std::time::Instant::now();
            let result = self.inner.notify(job, outcome).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, severity = %outcome.severity, "notified"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "notify failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
