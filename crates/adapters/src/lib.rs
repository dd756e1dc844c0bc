// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Concrete workers and notifiers

pub mod notify;
pub mod traced;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use notify::{LogNotifier, NotifierConfig, NotifierKind, SmtpConfig, SmtpError, SmtpNotifier};
pub use traced::{TracedNotifier, TracedWorker};
pub use worker::{
    CommandConfig, CommandWorker, DiskSpaceConfig, DiskSpaceWorker, HttpMethod, HttpWorker,
    HttpWorkerConfig, Thresholds, WorkerConfig,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use vigil_core::{FailingNotifier, FakeRun, FakeWorker, NotifyCall, RecordingNotifier};
