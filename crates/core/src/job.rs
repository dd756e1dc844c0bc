// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job: one worker bound to its schedules, notifiers and tolerance policy
//!
//! When one of the job's schedules reports due, the job runs its worker,
//! classifies the outcome against its own and the global ignore rules, then
//! either asks that same schedule to retry sooner or hands the outcome to
//! every notifier. The outcome is kept as the job's last result either way.

use crate::clock::Clock;
use crate::error::JobError;
use crate::notifier::Notifier;
use crate::outcome::{Failure, Outcome};
use crate::policy::{IgnoreRule, IgnoreRules, SharedRules};
use crate::schedule::Schedule;
use crate::status::JobStatus;
use crate::tolerance::{Decision, Tolerance, ToleranceCounters};
use crate::worker::Worker;
use chrono::NaiveDateTime;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

pub struct Job {
    name: String,
    worker: Option<Arc<dyn Worker>>,
    schedules: Vec<Box<dyn Schedule>>,
    notifiers: Vec<Arc<dyn Notifier>>,
    rules: IgnoreRules,
    global_rules: Option<SharedRules>,
    tolerance: Tolerance,
    counters: ToleranceCounters,
    last_outcome: Option<Outcome>,
    last_run_at: Option<NaiveDateTime>,
}

impl Job {
    /// An empty job: no worker, schedules or notifiers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worker: None,
            schedules: Vec::new(),
            notifiers: Vec::new(),
            rules: IgnoreRules::new(),
            global_rules: None,
            tolerance: Tolerance::default(),
            counters: ToleranceCounters::new(),
            last_outcome: None,
            last_run_at: None,
        }
    }

    /// A job named after its worker's description
    pub fn for_worker(worker: impl Worker) -> Self {
        let name = worker.description();
        Self::new(name).with_worker(worker)
    }

    pub fn with_worker(mut self, worker: impl Worker) -> Self {
        self.set_worker(worker);
        self
    }

    pub fn with_schedule(mut self, schedule: impl Schedule + 'static) -> Self {
        self.add_schedule(Box::new(schedule));
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier) -> Self {
        self.add_notifier(Arc::new(notifier));
        self
    }

    pub fn with_rule(mut self, rule: IgnoreRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replace the worker
    pub fn set_worker(&mut self, worker: impl Worker) {
        self.worker = Some(Arc::new(worker));
    }

    pub fn set_shared_worker(&mut self, worker: Arc<dyn Worker>) {
        self.worker = Some(worker);
    }

    pub fn add_schedule(&mut self, schedule: Box<dyn Schedule>) {
        self.schedules.push(schedule);
    }

    pub fn add_notifier(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn add_rule(&mut self, rule: IgnoreRule) {
        self.rules.push(rule);
    }

    /// Bind the job to the manager's global ignore rules.
    ///
    /// Must be called exactly once before the job is checked.
    pub fn init(&mut self, global_rules: SharedRules) -> Result<(), JobError> {
        if self.global_rules.is_some() {
            return Err(JobError::AlreadyInitialized(self.name.clone()));
        }
        self.global_rules = Some(global_rules);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.global_rules.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    pub fn schedules(&self) -> &[Box<dyn Schedule>] {
        &self.schedules
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    pub fn rules(&self) -> &IgnoreRules {
        &self.rules
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn counters(&self) -> &ToleranceCounters {
        &self.counters
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    pub fn last_run_at(&self) -> Option<NaiveDateTime> {
        self.last_run_at
    }

    pub fn status(&self) -> JobStatus {
        match &self.last_outcome {
            Some(outcome) => JobStatus {
                name: self.name.clone(),
                severity: Some(outcome.severity),
                state: Some(outcome.state),
                short_message: outcome.short_message.clone(),
                detailed_message: outcome.detailed_message.clone(),
                last_run_at: self.last_run_at,
            },
            None => JobStatus::pending(&self.name),
        }
    }

    /// Poll every schedule in order, handling each one that is due before
    /// moving on to the next.
    ///
    /// Returns whether any schedule fired.
    pub async fn check_schedules<C: Clock>(&mut self, clock: &C) -> Result<bool, JobError> {
        if !self.is_initialized() {
            return Err(JobError::NotInitialized(self.name.clone()));
        }

        let mut fired = false;
        for index in 0..self.schedules.len() {
            let now = clock.now();
            let due = self.schedules[index].poll(now);
            tracing::trace!(job = %self.name, schedule = index, due, "schedule polled");
            if due {
                fired = true;
                self.on_due(index, clock).await;
            }
        }
        Ok(fired)
    }

    /// Handle a due signal from the schedule at `index`.
    ///
    /// Returns `None` when the job has no worker.
    pub async fn on_due<C: Clock>(&mut self, index: usize, clock: &C) -> Option<Decision> {
        let Some(worker) = self.worker.clone() else {
            tracing::debug!(job = %self.name, "no worker bound, skipping");
            return None;
        };

        let outcome = execute(&self.name, worker, clock).await;

        let global = self
            .global_rules
            .as_ref()
            .map(SharedRules::snapshot)
            .unwrap_or_default();
        let decision = self
            .counters
            .classify(&outcome, &self.rules, &global, &self.tolerance);

        match &decision {
            Decision::Ignore { rule, retry_delay } => {
                tracing::info!(
                    job = %self.name,
                    schedule = index,
                    rule = %rule,
                    retry_ms = retry_delay.as_millis() as u64,
                    total = self.counters.total_consecutive_ignored(),
                    decision = "ignore",
                    "failure ignored, retrying sooner"
                );
                if let Some(schedule) = self.schedules.get_mut(index) {
                    schedule.request_reschedule(*retry_delay);
                }
            }
            Decision::Notify(reason) => {
                tracing::info!(
                    job = %self.name,
                    schedule = index,
                    severity = %outcome.severity,
                    state = outcome.state,
                    reason = %reason,
                    decision = "notify",
                    "forwarding outcome"
                );
                self.deliver(&outcome).await;
            }
        }

        self.last_outcome = Some(outcome);
        self.last_run_at = Some(clock.now());
        Some(decision)
    }

    /// Hand the outcome to each notifier in turn, isolating their failures
    async fn deliver(&self, outcome: &Outcome) {
        for notifier in &self.notifiers {
            let name = notifier.name();
            let notifier = Arc::clone(notifier);
            let job = self.name.clone();
            let outcome = outcome.clone();
            let delivery = tokio::spawn(async move { notifier.notify(&job, &outcome).await });

            match delivery.await {
                Ok(Ok(())) => tracing::debug!(job = %self.name, notifier = %name, "delivered"),
                Ok(Err(e)) => tracing::warn!(
                    job = %self.name,
                    notifier = %name,
                    error = %e,
                    "notifier failed"
                ),
                Err(e) => tracing::error!(
                    job = %self.name,
                    notifier = %name,
                    error = %e,
                    "notifier panicked"
                ),
            }
        }
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("has_worker", &self.worker.is_some())
            .field("schedules", &self.schedules)
            .field("notifiers", &self.notifiers.len())
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

/// Run the worker in its own task so a panic surfaces as a [`Failure`]
async fn execute<C: Clock>(job: &str, worker: Arc<dyn Worker>, clock: &C) -> Outcome {
    let description = worker.description();
    tracing::debug!(job, worker = %description, "running worker");

    let start = Instant::now();
    let run = tokio::spawn(async move { worker.run().await });
    let result = match run.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(Failure::new("panic", panic_message(e.into_panic()))),
        Err(e) => Err(Failure::new("cancelled", e.to_string())),
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(outcome) => {
            tracing::debug!(job, elapsed_ms, severity = %outcome.severity, "worker finished");
            outcome
        }
        Err(failure) => {
            tracing::debug!(job, elapsed_ms, failure = %failure, "worker failed");
            Outcome::raised(&description, failure, clock.now())
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
