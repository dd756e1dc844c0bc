// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-interval schedule restricted to days of the week and a daily window
//!
//! Due when today is an allowed day, the time of day falls inside the
//! window, and at least `min(every, pending retry delay)` has passed since
//! the last firing. A schedule that has never fired is due as soon as the
//! day and window allow it.

use super::{DaysOfWeek, Schedule};
use crate::clock::to_chrono;
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Daily time-of-day window `[start, end)`.
///
/// No `end` runs the window to the end of the day. `end < start` wraps past
/// midnight and `end == start` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn from_start(start: NaiveTime) -> Self {
        Self { start, end: None }
    }

    pub fn all_day() -> Self {
        Self::from_start(NaiveTime::MIN)
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        match self.end {
            None => time >= self.start,
            Some(end) if self.start < end => time >= self.start && time < end,
            Some(end) if end < self.start => time >= self.start || time < end,
            Some(_) => false,
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::all_day()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            None if self.start == NaiveTime::MIN => write!(f, "all day"),
            None => write!(f, "from {}", self.start.format("%H:%M:%S")),
            Some(end) => write!(
                f,
                "{}-{}",
                self.start.format("%H:%M:%S"),
                end.format("%H:%M:%S")
            ),
        }
    }
}

/// Configuration for a [`FixedInterval`] schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIntervalConfig {
    /// Fire frequency; zero disables the schedule
    #[serde(with = "humantime_serde")]
    pub every: Duration,
    #[serde(default)]
    pub days: DaysOfWeek,
    /// Window start (inclusive), `HH:MM[:SS]`
    #[serde(default = "midnight", with = "time_of_day")]
    pub start: NaiveTime,
    /// Window end (exclusive), `HH:MM[:SS]`; unset runs to the end of the day
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time_of_day::optional"
    )]
    pub end: Option<NaiveTime>,
}

fn midnight() -> NaiveTime {
    NaiveTime::MIN
}

impl FixedIntervalConfig {
    pub fn new(every: Duration) -> Self {
        Self {
            every,
            days: DaysOfWeek::default(),
            start: midnight(),
            end: None,
        }
    }

    pub fn on(mut self, days: DaysOfWeek) -> Self {
        self.days = days;
        self
    }

    pub fn between(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = start;
        self.end = Some(end);
        self
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end,
        }
    }
}

/// Fire every `every`, on allowed days, inside the daily window
#[derive(Debug, Clone)]
pub struct FixedInterval {
    config: FixedIntervalConfig,
    last_fired: Option<NaiveDateTime>,
    pending_delay: Option<Duration>,
}

impl FixedInterval {
    pub fn new(config: FixedIntervalConfig) -> Self {
        Self {
            config,
            last_fired: None,
            pending_delay: None,
        }
    }

    pub fn config(&self) -> &FixedIntervalConfig {
        &self.config
    }

    pub fn last_fired(&self) -> Option<NaiveDateTime> {
        self.last_fired
    }

    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending_delay
    }

    /// Effective wait since the last firing
    pub fn wait(&self) -> Duration {
        match self.pending_delay {
            Some(delay) => delay.min(self.config.every),
            None => self.config.every,
        }
    }

    /// Earliest time the interval allows the next firing, ignoring day/window
    pub fn next_eligible(&self) -> Option<NaiveDateTime> {
        self.last_fired
            .map(|last| last.checked_add_signed(to_chrono(self.wait())).unwrap_or(NaiveDateTime::MAX))
    }
}

impl Schedule for FixedInterval {
    fn is_due(&self, now: NaiveDateTime) -> bool {
        if !self.config.days.contains(now.weekday()) {
            return false;
        }
        if self.config.every.is_zero() {
            return false;
        }
        if !self.config.window().contains(now.time()) {
            return false;
        }
        match self.next_eligible() {
            Some(next) => next <= now,
            None => true,
        }
    }

    fn mark_fired(&mut self, now: NaiveDateTime) {
        self.last_fired = Some(now);
        self.pending_delay = None;
    }

    fn request_reschedule(&mut self, delay: Duration) {
        // Zero is the unset state
        if delay.is_zero() {
            return;
        }
        let delay = match self.pending_delay {
            Some(pending) => pending.min(delay),
            None => delay,
        };
        if delay < self.config.every {
            self.pending_delay = Some(delay);
        }
    }

    fn describe(&self) -> String {
        format!(
            "every {} ({}, {})",
            humantime::format_duration(self.config.every),
            self.config.days,
            self.config.window()
        )
    }
}

/// `HH:MM[:SS]` (de)serialization for times of day
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time of day {:?}: {}", s, e)))
    }

    pub mod optional {
        use chrono::NaiveTime;
        use serde::{Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            super::deserialize(deserializer).map(Some)
        }
    }
}
