// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager: owns the jobs and drives the heartbeat loop
//!
//! Heartbeats are serialized: a tick holds the tick lock until every job
//! has been checked, and the timer loop awaits each tick before taking the
//! next one, dropping ticks that fall behind. Each job sits behind its own
//! lock so a job's counters and schedules have a single writer. Jobs are
//! checked in their own tasks; a panicking job is logged and the tick
//! moves on to the next one.

use crate::clock::{Clock, SystemClock};
use crate::error::ManagerError;
use crate::job::Job;
use crate::policy::SharedRules;
use crate::status::JobStatus;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default heartbeat interval
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(1);

const MIN_HEARTBEAT: Duration = Duration::from_millis(1);

/// Called after a tick in which at least one job fired
pub type ReclaimHook = Arc<dyn Fn() + Send + Sync>;

/// What one heartbeat did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Skipped because a stop was signaled
    pub skipped: bool,
    pub checked: usize,
    pub fired: usize,
    pub failed: usize,
}

struct Shared<C> {
    clock: C,
    jobs: RwLock<Vec<Arc<tokio::sync::Mutex<Job>>>>,
    board: Mutex<Vec<JobStatus>>,
    tick: tokio::sync::Mutex<()>,
}

impl<C: Clock> Shared<C> {
    fn job_handles(&self) -> Vec<Arc<tokio::sync::Mutex<Job>>> {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn board(&self) -> MutexGuard<'_, Vec<JobStatus>> {
        self.board.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, index: usize, status: JobStatus) {
        if let Some(slot) = self.board().get_mut(index) {
            *slot = status;
        }
    }
}

struct Running {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Lifecycle {
    initialized: bool,
    running: Option<Running>,
}

pub struct Manager<C: Clock = SystemClock> {
    shared: Arc<Shared<C>>,
    heartbeat: Duration,
    global_rules: SharedRules,
    reclaim_after_fire: bool,
    on_reclaim: Option<ReclaimHook>,
    lifecycle: Mutex<Lifecycle>,
}

impl Manager<SystemClock> {
    pub fn new(heartbeat: Duration) -> Self {
        Self::with_clock(SystemClock, heartbeat)
    }
}

impl<C: Clock> Manager<C> {
    pub fn with_clock(clock: C, heartbeat: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                clock,
                jobs: RwLock::new(Vec::new()),
                board: Mutex::new(Vec::new()),
                tick: tokio::sync::Mutex::new(()),
            }),
            heartbeat,
            global_rules: SharedRules::default(),
            reclaim_after_fire: true,
            on_reclaim: None,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    pub fn with_global_rules(mut self, rules: SharedRules) -> Self {
        self.global_rules = rules;
        self
    }

    pub fn reclaim_after_fire(mut self, enabled: bool) -> Self {
        self.reclaim_after_fire = enabled;
        self
    }

    pub fn on_reclaim(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_reclaim = Some(Arc::new(hook));
        self
    }

    /// Add a job. Jobs added after [`Manager::init`] are initialized here.
    pub fn add_job(&self, mut job: Job) -> Result<(), ManagerError> {
        let lifecycle = self.lifecycle();
        if lifecycle.initialized {
            job.init(self.global_rules.clone())?;
        }
        let status = job.status();
        self.shared
            .jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(tokio::sync::Mutex::new(job)));
        self.shared.board().push(status);
        drop(lifecycle);
        Ok(())
    }

    pub fn with_job(self, job: Job) -> Result<Self, ManagerError> {
        self.add_job(job)?;
        Ok(self)
    }

    pub fn jobs_len(&self) -> usize {
        self.shared.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat
    }

    /// The global ignore rules; changes take effect on the next classification
    pub fn global_rules(&self) -> &SharedRules {
        &self.global_rules
    }

    pub fn clock(&self) -> &C {
        &self.shared.clock
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle().initialized
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle().running.is_some()
    }

    /// Latest status of every job, without waiting for an in-flight tick
    pub fn status(&self) -> Vec<JobStatus> {
        self.shared.board().clone()
    }

    /// Bind every job to the global rules
    pub async fn init(&self) -> Result<(), ManagerError> {
        let jobs = {
            let mut lifecycle = self.lifecycle();
            if lifecycle.initialized {
                return Err(ManagerError::AlreadyInitialized);
            }
            lifecycle.initialized = true;
            self.shared.job_handles()
        };

        for job in jobs {
            job.lock().await.init(self.global_rules.clone())?;
        }
        tracing::debug!(jobs = self.jobs_len(), "manager initialized");
        Ok(())
    }

    /// Start the heartbeat loop on the current tokio runtime, initializing
    /// first if needed
    pub async fn start(&self) -> Result<(), ManagerError> {
        if self.is_running() {
            return Err(ManagerError::AlreadyRunning);
        }
        match self.init().await {
            Ok(()) | Err(ManagerError::AlreadyInitialized) => {}
            Err(e) => return Err(e),
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ManagerError::NoRuntime)?;

        let mut lifecycle = self.lifecycle();
        if lifecycle.running.is_some() {
            return Err(ManagerError::AlreadyRunning);
        }
        let (stop, stop_rx) = watch::channel(false);
        let handle = runtime.spawn(run_loop(
            Arc::clone(&self.shared),
            self.heartbeat.max(MIN_HEARTBEAT),
            self.reclaim_hook(),
            stop_rx,
        ));
        lifecycle.running = Some(Running { stop, handle });

        tracing::info!(
            jobs = self.jobs_len(),
            heartbeat_ms = self.heartbeat.as_millis() as u64,
            "manager started"
        );
        Ok(())
    }

    /// Stop the heartbeat loop. A tick already in flight runs to completion.
    pub async fn stop(&self) -> Result<(), ManagerError> {
        let running = self
            .lifecycle()
            .running
            .take()
            .ok_or(ManagerError::NotRunning)?;

        let _ = running.stop.send(true);
        if let Err(e) = running.handle.await {
            tracing::error!(error = %e, "heartbeat loop ended abnormally");
        }
        tracing::info!("manager stopped");
        Ok(())
    }

    /// Run one heartbeat now, serialized with the timer loop.
    ///
    /// This is the manual entry point for hosts and tests that drive ticks
    /// themselves. It bypasses the lifecycle: it runs whether or not the
    /// timer loop is running, and a stop never skips it. Jobs that have not
    /// been initialized fail their check and are counted in `failed`.
    pub async fn heartbeat(&self) -> TickSummary {
        let summary = tick(&self.shared, None).await;
        if let Some(reclaim) = self.reclaim_hook() {
            reclaim_if_fired(&summary, &reclaim);
        }
        summary
    }

    fn reclaim_hook(&self) -> Option<ReclaimHook> {
        if !self.reclaim_after_fire {
            return None;
        }
        match &self.on_reclaim {
            Some(hook) => Some(Arc::clone(hook)),
            None => {
                let hint: ReclaimHook = Arc::new(|| tracing::trace!("reclaim hint"));
                Some(hint)
            }
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock> Drop for Manager<C> {
    fn drop(&mut self) {
        if let Some(running) = self.lifecycle().running.take() {
            let _ = running.stop.send(true);
        }
    }
}

impl<C: Clock> std::fmt::Debug for Manager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("jobs", &self.jobs_len())
            .field("heartbeat", &self.heartbeat)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn run_loop<C: Clock>(
    shared: Arc<Shared<C>>,
    period: Duration,
    reclaim: Option<ReclaimHook>,
    mut stop: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = interval.tick() => {
                let tick_shared = Arc::clone(&shared);
                let tick_stop = stop.clone();
                let handle = tokio::spawn(async move { tick(&tick_shared, Some(&tick_stop)).await });
                match handle.await {
                    Ok(summary) => {
                        if let Some(reclaim) = &reclaim {
                            reclaim_if_fired(&summary, reclaim);
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "heartbeat panicked"),
                }
            }
        }
    }
    tracing::debug!("heartbeat loop exited");
}

async fn tick<C: Clock>(shared: &Arc<Shared<C>>, stop: Option<&watch::Receiver<bool>>) -> TickSummary {
    let _serial = shared.tick.lock().await;
    if stop.is_some_and(|rx| *rx.borrow()) {
        tracing::trace!("stop signaled, skipping heartbeat");
        return TickSummary {
            skipped: true,
            ..TickSummary::default()
        };
    }

    tracing::trace!("heartbeat");
    let mut summary = TickSummary::default();
    for (index, job) in shared.job_handles().into_iter().enumerate() {
        let job_shared = Arc::clone(shared);
        let check = tokio::spawn(async move {
            let mut job = job.lock().await;
            let result = job.check_schedules(&job_shared.clock).await;
            job_shared.publish(index, job.status());
            result
        });

        summary.checked += 1;
        match check.await {
            Ok(Ok(true)) => summary.fired += 1,
            Ok(Ok(false)) => {}
            Ok(Err(e)) => {
                summary.failed += 1;
                tracing::warn!(job = index, error = %e, "job check failed");
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(job = index, error = %e, "job check panicked");
            }
        }
    }
    tracing::trace!(fired = summary.fired, failed = summary.failed, "heartbeat done");
    summary
}

fn reclaim_if_fired(summary: &TickSummary, reclaim: &ReclaimHook) {
    if summary.fired > 0 {
        reclaim();
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
