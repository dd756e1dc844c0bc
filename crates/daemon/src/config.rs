// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML configuration: manager settings, global ignore rules and jobs
//!
//! ```toml
//! [manager]
//! heartbeat = "1s"
//!
//! [[ignore]]
//! kind = "timeout"
//! max_consecutive = 2
//!
//! [[job]]
//! name = "homepage"
//! worker = { kind = "http", url = "https://example.com" }
//! schedule = [{ kind = "fixed_interval", every = "5m", days = "weekdays" }]
//! notify = [{ kind = "log" }]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use vigil_adapters::{NotifierConfig, SmtpError, WorkerConfig};
use vigil_core::{
    IgnoreRule, IgnoreRuleConfig, IgnoreRules, Job, Manager, ManagerError, RuleError,
    ScheduleSpec, SharedRules, Tolerance, DEFAULT_HEARTBEAT,
};

/// Errors found while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("heartbeat must be greater than zero")]
    ZeroHeartbeat,

    #[error("duplicate job name: {0}")]
    DuplicateJob(String),

    #[error("global ignore rule: {0}")]
    GlobalRule(#[source] RuleError),

    #[error("job {job}: {source}")]
    JobRule {
        job: String,
        #[source]
        source: RuleError,
    },

    #[error("job {job}: notifier {index}: {source}")]
    Notifier {
        job: String,
        index: usize,
        #[source]
        source: SmtpError,
    },

    #[error("job {job}: {source}")]
    Manager {
        job: String,
        #[source]
        source: ManagerError,
    },
}

/// `[manager]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerSection {
    #[serde(default = "default_heartbeat", with = "humantime_serde")]
    pub heartbeat: Duration,
    /// Run the reclaim hook after ticks in which a job fired
    #[serde(default)]
    pub reclaim_after_fire: bool,
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            heartbeat: default_heartbeat(),
            reclaim_after_fire: false,
        }
    }
}

fn default_heartbeat() -> Duration {
    DEFAULT_HEARTBEAT
}

/// One `[[job]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Defaults to the worker's description
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_max_consecutive_ignored")]
    pub max_consecutive_ignored: u32,
    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub retry_delay: Duration,
    pub worker: WorkerConfig,
    #[serde(default)]
    pub schedule: Vec<ScheduleSpec>,
    #[serde(default)]
    pub notify: Vec<NotifierConfig>,
    #[serde(default)]
    pub ignore: Vec<IgnoreRuleConfig>,
}

fn default_max_consecutive_ignored() -> u32 {
    Tolerance::default().max_consecutive_ignored
}

fn default_retry_delay() -> Duration {
    Tolerance::default().retry_delay
}

impl JobConfig {
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            max_consecutive_ignored: self.max_consecutive_ignored,
            retry_delay: self.retry_delay,
        }
    }

    /// Build the job with its worker, schedules, notifiers and rules
    pub fn build(&self) -> Result<Job, ConfigError> {
        let worker = self.worker.build();
        let name = self.name.clone().unwrap_or_else(|| worker.description());

        let mut job = Job::new(name.clone()).with_tolerance(self.tolerance());
        job.set_shared_worker(worker);
        for spec in &self.schedule {
            job.add_schedule(spec.build());
        }
        for (index, notify) in self.notify.iter().enumerate() {
            let notifier = notify.build().map_err(|source| ConfigError::Notifier {
                job: name.clone(),
                index,
                source,
            })?;
            job.add_notifier(notifier);
        }
        for rule in &self.ignore {
            let rule = IgnoreRule::try_from(rule.clone()).map_err(|source| {
                ConfigError::JobRule {
                    job: name.clone(),
                    source,
                }
            })?;
            job.add_rule(rule);
        }
        Ok(job)
    }
}

/// A whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    #[serde(default)]
    pub manager: ManagerSection,
    #[serde(default)]
    pub ignore: Vec<IgnoreRuleConfig>,
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobConfig>,
}

impl VigilConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        if config.manager.heartbeat.is_zero() {
            return Err(ConfigError::ZeroHeartbeat);
        }
        Ok(config)
    }

    pub fn global_rules(&self) -> Result<IgnoreRules, ConfigError> {
        self.ignore
            .iter()
            .cloned()
            .map(|rule| IgnoreRule::try_from(rule).map_err(ConfigError::GlobalRule))
            .collect()
    }

    /// Build every job, rejecting duplicate names
    pub fn build_jobs(&self) -> Result<Vec<Job>, ConfigError> {
        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(self.jobs.len());
        for config in &self.jobs {
            let job = config.build()?;
            if !seen.insert(job.name().to_string()) {
                return Err(ConfigError::DuplicateJob(job.name().to_string()));
            }
            jobs.push(job);
        }
        Ok(jobs)
    }

    /// Build the manager with all jobs added; the manager is not started
    pub fn build_manager(&self) -> Result<Manager, ConfigError> {
        self.manager_for(self.build_jobs()?)
    }

    /// Build the manager around jobs already built from this configuration
    pub fn manager_for(&self, jobs: Vec<Job>) -> Result<Manager, ConfigError> {
        let rules = SharedRules::new(self.global_rules()?);
        let manager = Manager::new(self.manager.heartbeat)
            .with_global_rules(rules)
            .reclaim_after_fire(self.manager.reclaim_after_fire);
        for job in jobs {
            let name = job.name().to_string();
            manager
                .add_job(job)
                .map_err(|source| ConfigError::Manager { job: name, source })?;
        }
        Ok(manager)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
