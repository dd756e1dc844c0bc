// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome of a single worker execution
//!
//! An [`Outcome`] is built once by a worker (or synthesized by the job when
//! the worker itself fails), classified, then either folded into the
//! tolerance counters or handed to every notifier.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use thiserror::Error;

/// Reserved state code for an outcome synthesized from a worker failure.
///
/// Workers must not use this value for their own states.
pub const STATE_FAILURE_RAISED: i32 = i32::MIN;

/// Severity of an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    /// The worker failed instead of producing an outcome
    Raised,
}

impl Severity {
    const fn bit(self) -> u8 {
        match self {
            Severity::Ok => 0b0001,
            Severity::Warning => 0b0010,
            Severity::Critical => 0b0100,
            Severity::Raised => 0b1000,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "ok"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
            Severity::Raised => write!(f, "raised"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Severity::Ok),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            "raised" => Ok(Severity::Raised),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Set of severities, used by notifiers to filter what they deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeverityMask(u8);

impl SeverityMask {
    pub const NONE: SeverityMask = SeverityMask(0);
    pub const ALL: SeverityMask = SeverityMask(0b1111);
    pub const WARNING_AND_CRITICAL: SeverityMask = SeverityMask(
        Severity::Warning.bit() | Severity::Critical.bit() | Severity::Raised.bit(),
    );

    pub fn contains(self, severity: Severity) -> bool {
        self.0 & severity.bit() != 0
    }

    pub fn with(self, severity: Severity) -> Self {
        SeverityMask(self.0 | severity.bit())
    }
}

impl Default for SeverityMask {
    fn default() -> Self {
        SeverityMask::ALL
    }
}

impl From<Severity> for SeverityMask {
    fn from(severity: Severity) -> Self {
        SeverityMask(severity.bit())
    }
}

impl BitOr for SeverityMask {
    type Output = SeverityMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        SeverityMask(self.0 | rhs.0)
    }
}

impl BitOr<Severity> for SeverityMask {
    type Output = SeverityMask;

    fn bitor(self, rhs: Severity) -> Self::Output {
        self.with(rhs)
    }
}

impl FromIterator<Severity> for SeverityMask {
    fn from_iter<T: IntoIterator<Item = Severity>>(iter: T) -> Self {
        iter.into_iter().fold(SeverityMask::NONE, SeverityMask::with)
    }
}

/// A worker failure.
///
/// `kind` is the failure's category (`io`, `timeout`, `http`, `panic`, ...)
/// and is what ignore rules match on first.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: String,
    pub message: String,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn io(err: &std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::TimedOut {
            "timeout"
        } else {
            "io"
        };
        Self::new(kind, err.to_string())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new("timeout", message)
    }
}

/// The outcome of one worker execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Worker-defined state code, opaque except for [`STATE_FAILURE_RAISED`]
    pub state: i32,
    pub severity: Severity,
    pub short_message: String,
    pub detailed_message: String,
    /// Present only when `severity` is [`Severity::Raised`]
    pub failure: Option<Failure>,
}

impl Outcome {
    pub fn new(state: i32, severity: Severity) -> Self {
        Self {
            state,
            severity,
            short_message: String::new(),
            detailed_message: String::new(),
            failure: None,
        }
    }

    pub fn ok(state: i32) -> Self {
        Self::new(state, Severity::Ok)
    }

    pub fn warning(state: i32) -> Self {
        Self::new(state, Severity::Warning)
    }

    pub fn critical(state: i32) -> Self {
        Self::new(state, Severity::Critical)
    }

    /// Outcome standing in for a worker that failed to run.
    ///
    /// The short message is the worker's description; the detailed message
    /// carries the failure and when it happened.
    pub fn raised(description: &str, failure: Failure, at: NaiveDateTime) -> Self {
        Self {
            state: STATE_FAILURE_RAISED,
            severity: Severity::Raised,
            short_message: description.to_string(),
            detailed_message: format!("Failure at {}: {}", at.format("%Y-%m-%d %H:%M:%S"), failure),
            failure: Some(failure),
        }
    }

    pub fn with_short_message(mut self, message: impl Into<String>) -> Self {
        self.short_message = message.into();
        self
    }

    pub fn with_detailed_message(mut self, message: impl Into<String>) -> Self {
        self.detailed_message = message.into();
        self
    }

    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Raised
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
