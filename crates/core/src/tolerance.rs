// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure tolerance bookkeeping
//!
//! Two budgets decide whether a matched failure is still ignorable: the
//! matched rule's own consecutive limit, and the job's limit on consecutive
//! ignored failures of any kind. Anything not ignorable resets every counter.

use crate::outcome::{Outcome, Severity};
use crate::policy::IgnoreRules;
use std::fmt;
use std::time::Duration;

/// Result of classifying an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Suppress notification and retry the triggering schedule sooner
    Ignore { rule: String, retry_delay: Duration },
    /// Forward to every notifier
    Notify(NotifyReason),
}

impl Decision {
    pub fn is_ignore(&self) -> bool {
        matches!(self, Decision::Ignore { .. })
    }
}

/// Why an outcome is being forwarded to notifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyReason {
    /// Ok, Warning or Critical outcome from the worker
    NotAFailure,
    /// The failure matched neither the job's nor the global rules
    NoMatchingRule,
    /// The same failure identity exceeded its rule's limit
    RuleLimitExceeded { rule: String, count: u32 },
    /// Consecutive ignored failures of any kind exceeded the job's limit
    TotalLimitExceeded { count: u32 },
}

impl fmt::Display for NotifyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyReason::NotAFailure => write!(f, "not a failure"),
            NotifyReason::NoMatchingRule => write!(f, "no matching ignore rule"),
            NotifyReason::RuleLimitExceeded { rule, count } => {
                write!(f, "{} consecutive {} failures", count, rule)
            }
            NotifyReason::TotalLimitExceeded { count } => {
                write!(f, "{} consecutive ignored failures", count)
            }
        }
    }
}

/// Per-job tolerance limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance {
    /// Maximum consecutive ignored failures across all rules
    pub max_consecutive_ignored: u32,
    /// Retry delay for rules that do not set their own
    pub retry_delay: Duration,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            max_consecutive_ignored: 3,
            retry_delay: Duration::from_secs(20),
        }
    }
}

/// Consecutive-failure counters owned by a job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToleranceCounters {
    total_consecutive_ignored: u32,
    last_identity: Option<String>,
    last_identity_count: u32,
}

impl ToleranceCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_consecutive_ignored(&self) -> u32 {
        self.total_consecutive_ignored
    }

    pub fn last_identity(&self) -> Option<&str> {
        self.last_identity.as_deref()
    }

    pub fn last_identity_count(&self) -> u32 {
        self.last_identity_count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Classify an outcome, updating the counters.
    ///
    /// Job rules are searched before global rules.
    pub fn classify(
        &mut self,
        outcome: &Outcome,
        job_rules: &IgnoreRules,
        global_rules: &IgnoreRules,
        tolerance: &Tolerance,
    ) -> Decision {
        let decision = self.evaluate(outcome, job_rules, global_rules, tolerance);
        if !decision.is_ignore() {
            self.reset();
        }
        decision
    }

    fn evaluate(
        &mut self,
        outcome: &Outcome,
        job_rules: &IgnoreRules,
        global_rules: &IgnoreRules,
        tolerance: &Tolerance,
    ) -> Decision {
        let failure = match (&outcome.severity, &outcome.failure) {
            (Severity::Raised, Some(failure)) => failure,
            (Severity::Raised, None) => return Decision::Notify(NotifyReason::NoMatchingRule),
            _ => return Decision::Notify(NotifyReason::NotAFailure),
        };

        let Some(rule) = job_rules
            .find(failure)
            .or_else(|| global_rules.find(failure))
        else {
            return Decision::Notify(NotifyReason::NoMatchingRule);
        };

        let retry_delay = rule.retry_delay().unwrap_or(tolerance.retry_delay);

        if self.last_identity.as_deref() != Some(rule.name()) {
            self.last_identity = Some(rule.name().to_string());
            self.last_identity_count = 0;
        }
        self.last_identity_count += 1;
        self.total_consecutive_ignored += 1;

        if self.last_identity_count > rule.max_consecutive() {
            Decision::Notify(NotifyReason::RuleLimitExceeded {
                rule: rule.name().to_string(),
                count: self.last_identity_count,
            })
        } else if self.total_consecutive_ignored > tolerance.max_consecutive_ignored {
            Decision::Notify(NotifyReason::TotalLimitExceeded {
                count: self.total_consecutive_ignored,
            })
        } else {
            Decision::Ignore {
                rule: rule.name().to_string(),
                retry_delay,
            }
        }
    }
}

#[cfg(test)]
#[path = "tolerance_tests.rs"]
mod tests;
