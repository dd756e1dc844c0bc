// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake workers and notifiers for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::notifier::{NotifyError, Notifier};
use crate::outcome::{Failure, Outcome};
use crate::worker::Worker;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behaviour for one [`FakeWorker`] run
#[derive(Debug, Clone)]
pub enum FakeRun {
    Return(Outcome),
    Fail(Failure),
    Panic(String),
    /// Sleep, then return the outcome
    Slow(Duration, Outcome),
}

/// Worker that replays a script, then repeats a fallback forever
#[derive(Clone)]
pub struct FakeWorker {
    description: String,
    script: Arc<Mutex<VecDeque<FakeRun>>>,
    fallback: FakeRun,
    runs: Arc<AtomicUsize>,
}

impl FakeWorker {
    pub fn new(description: impl Into<String>, fallback: FakeRun) -> Self {
        Self {
            description: description.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Worker that always returns an OK outcome
    pub fn ok(description: impl Into<String>) -> Self {
        Self::new(description, FakeRun::Return(Outcome::ok(0)))
    }

    /// Worker that always fails with the given failure kind
    pub fn failing(description: impl Into<String>, kind: &str) -> Self {
        Self::new(description, FakeRun::Fail(Failure::new(kind, "scripted failure")))
    }

    /// Queue a run ahead of the fallback
    pub fn then(self, run: FakeRun) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(run);
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    fn next_run(&self) -> FakeRun {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl Worker for FakeWorker {
    fn description(&self) -> String {
        self.description.clone()
    }

    #[allow(clippy::panic)]
    async fn run(&self) -> Result<Outcome, Failure> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match self.next_run() {
            FakeRun::Return(outcome) => Ok(outcome),
            FakeRun::Fail(failure) => Err(failure),
            FakeRun::Panic(message) => panic!("{}", message),
            FakeRun::Slow(delay, outcome) => {
                tokio::time::sleep(delay).await;
                Ok(outcome)
            }
        }
    }
}

/// Recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyCall {
    pub job: String,
    pub outcome: Outcome,
}

/// Notifier that records every outcome it receives
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<NotifyCall>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> String {
        "recording".to_string()
    }

    async fn notify(&self, job: &str, outcome: &Outcome) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NotifyCall {
                job: job.to_string(),
                outcome: outcome.clone(),
            });
        Ok(())
    }
}

/// Notifier that errors (or panics) on every call
#[derive(Clone, Default)]
pub struct FailingNotifier {
    panics: bool,
    attempts: Arc<AtomicUsize>,
}

impl FailingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> String {
        "failing".to_string()
    }

    #[allow(clippy::panic)]
    async fn notify(&self, _job: &str, _outcome: &Outcome) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("notifier exploded");
        }
        Err(NotifyError::Delivery("mailbox unavailable".to_string()))
    }
}
