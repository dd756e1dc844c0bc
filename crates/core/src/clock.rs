// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Schedules reason about local wall-clock time (weekday and time of day),
//! so the clock hands out naive local timestamps rather than monotonic
//! instants.

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A clock that provides the current local time
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Real system clock (local time zone)
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    current: Arc<Mutex<NaiveDateTime>>,
}

impl FakeClock {
    /// Start at Monday 2026-01-05 09:00:00
    pub fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap_or_default();
        Self::at(start)
    }

    /// Start at a specific timestamp
    pub fn at(start: NaiveDateTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += to_chrono(duration);
    }

    /// Set the clock to a specific timestamp
    pub fn set(&self, at: NaiveDateTime) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = at;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Convert a std duration to a chrono duration, saturating on overflow
pub(crate) fn to_chrono(duration: Duration) -> ChronoDuration {
    ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX)
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
