// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! vigil-core: scheduling and retry decision engine
//!
//! This crate provides:
//! - Outcomes, severities and worker failures
//! - Schedules (fixed interval inside a day/time window)
//! - Ignore rules and the two-level failure tolerance classifier
//! - Worker and notifier contracts
//! - Jobs and the heartbeat-driven manager

pub mod clock;
pub mod error;
pub mod job;
pub mod manager;
pub mod notifier;
pub mod outcome;
pub mod policy;
pub mod schedule;
pub mod status;
pub mod tolerance;
pub mod worker;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{JobError, ManagerError};
pub use job::Job;
pub use manager::{Manager, ReclaimHook, TickSummary, DEFAULT_HEARTBEAT};
pub use notifier::{Notifier, NotifyError, SeverityFilter};
pub use outcome::{Failure, Outcome, Severity, SeverityMask, STATE_FAILURE_RAISED};
pub use policy::{IgnoreRule, IgnoreRuleConfig, IgnoreRules, RuleError, SharedRules, ANY_KIND};
pub use schedule::{
    DaysOfWeek, FixedInterval, FixedIntervalConfig, Schedule, ScheduleSpec, TimeWindow,
};
pub use status::JobStatus;
pub use tolerance::{Decision, NotifyReason, Tolerance, ToleranceCounters};
pub use worker::Worker;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FailingNotifier, FakeRun, FakeWorker, NotifyCall, RecordingNotifier};
