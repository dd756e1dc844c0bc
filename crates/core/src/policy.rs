// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ignore rules: which worker failures may be retried silently
//!
//! A rule matches a [`Failure`] by its `kind` and, optionally, a regex over
//! its message. Each job has its own rule list and a handle on the
//! manager's global list; the job list is consulted first.

use crate::outcome::Failure;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;

/// Kind that matches any failure kind
pub const ANY_KIND: &str = "*";

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern for rule {rule}: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// Serializable description of an ignore rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRuleConfig {
    /// Identity used for consecutive-occurrence counting; defaults to `kind`
    #[serde(default)]
    pub name: Option<String>,
    pub kind: String,
    /// Regex the failure message must match
    #[serde(default)]
    pub pattern: Option<String>,
    pub max_consecutive: u32,
    /// Falls back to the job's retry delay when absent
    #[serde(default, with = "humantime_serde")]
    pub retry_delay: Option<Duration>,
}

/// A compiled ignore rule
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    name: String,
    kind: String,
    pattern: Option<Regex>,
    max_consecutive: u32,
    retry_delay: Option<Duration>,
}

impl IgnoreRule {
    pub fn new(kind: impl Into<String>, max_consecutive: u32) -> Self {
        let kind = kind.into();
        Self {
            name: kind.clone(),
            kind,
            pattern: None,
            max_consecutive,
            retry_delay: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_consecutive(&self) -> u32 {
        self.max_consecutive
    }

    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_delay
    }

    pub fn matches(&self, failure: &Failure) -> bool {
        if self.kind != ANY_KIND && self.kind != failure.kind {
            return false;
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(&failure.message),
            None => true,
        }
    }
}

impl TryFrom<IgnoreRuleConfig> for IgnoreRule {
    type Error = RuleError;

    fn try_from(config: IgnoreRuleConfig) -> Result<Self, Self::Error> {
        let name = config.name.unwrap_or_else(|| config.kind.clone());
        let pattern = config
            .pattern
            .map(|p| Regex::new(&p))
            .transpose()
            .map_err(|source| RuleError::InvalidPattern {
                rule: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            kind: config.kind,
            pattern,
            max_consecutive: config.max_consecutive,
            retry_delay: config.retry_delay,
        })
    }
}

/// Ordered list of ignore rules; the first match wins
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules(Vec<IgnoreRule>);

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: IgnoreRule) {
        self.0.push(rule);
    }

    pub fn find(&self, failure: &Failure) -> Option<&IgnoreRule> {
        self.0.iter().find(|rule| rule.matches(failure))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IgnoreRule> {
        self.0.iter()
    }
}

impl From<Vec<IgnoreRule>> for IgnoreRules {
    fn from(rules: Vec<IgnoreRule>) -> Self {
        Self(rules)
    }
}

impl FromIterator<IgnoreRule> for IgnoreRules {
    fn from_iter<T: IntoIterator<Item = IgnoreRule>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Global rule list shared between the manager and its jobs.
///
/// Readers take a cheap snapshot; writers replace the whole list, so a
/// classification in progress never observes a half-applied change.
#[derive(Debug, Clone, Default)]
pub struct SharedRules {
    current: Arc<RwLock<Arc<IgnoreRules>>>,
}

impl SharedRules {
    pub fn new(rules: IgnoreRules) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(rules))),
        }
    }

    pub fn snapshot(&self) -> Arc<IgnoreRules> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn add(&self, rule: IgnoreRule) {
        self.update(|rules| rules.push(rule));
    }

    /// Remove every rule with the given name; returns how many were removed
    pub fn remove(&self, name: &str) -> usize {
        let mut removed = 0;
        self.update(|rules| {
            let before = rules.0.len();
            rules.0.retain(|r| r.name != name);
            removed = before - rules.0.len();
        });
        removed
    }

    fn update(&self, f: impl FnOnce(&mut IgnoreRules)) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let mut next = IgnoreRules::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
