// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedules decide when a job is due
//!
//! A [`Schedule`] is a level-triggered time predicate: the manager polls it
//! on every heartbeat and it answers whether the job should run right now.
//! Polling is check-and-mark in one step so repeated queries within the
//! same tick cannot double-fire.
//!
//! Variants are described by [`ScheduleSpec`]; adding a strategy means a new
//! variant there and a new [`Schedule`] impl, nothing in `Job` or `Manager`.

mod days;
mod fixed_interval;


#[cfg(test)]
#[path = "fixed_interval_tests.rs"]
mod fixed_interval_tests;

pub use days::DaysOfWeek;
pub use fixed_interval::{FixedInterval, FixedIntervalConfig, TimeWindow};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Time predicate deciding whether a job is due
pub trait Schedule: Send + Sync + fmt::Debug {
    /// Evaluate without side effects whether firing is warranted at `now`
    fn is_due(&self, now: NaiveDateTime) -> bool;

    /// Record a firing at `now`, consuming any pending reschedule request
    fn mark_fired(&mut self, now: NaiveDateTime);

    /// Shorten the wait before the next firing to at most `delay`.
    ///
    /// Never lengthens the configured cadence.
    fn request_reschedule(&mut self, delay: Duration);

    /// Short human-readable description for logs and status output
    fn describe(&self) -> String;

    /// Check-and-mark: returns true and records the firing if due
    fn poll(&mut self, now: NaiveDateTime) -> bool {
        if self.is_due(now) {
            self.mark_fired(now);
            true
        } else {
            false
        }
    }
}

/// Declarative description of a schedule, as found in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleSpec {
    FixedInterval(FixedIntervalConfig),
}

impl ScheduleSpec {
    pub fn build(&self) -> Box<dyn Schedule> {
        match self {
            ScheduleSpec::FixedInterval(config) => Box::new(FixedInterval::new(config.clone())),
        }
    }
}
