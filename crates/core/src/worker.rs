// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker contract: one unit of work producing an [`Outcome`]

use crate::outcome::{Failure, Outcome};
use async_trait::async_trait;

/// Performs one check and reports its outcome.
///
/// Workers carry all of their input in their own configuration. A job never
/// runs the same worker concurrently with itself, so implementations need
/// not be re-entrant. Timeouts are the worker's own business.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Human-readable description, used as the job's default name and as the
    /// short message of a synthesized failure outcome
    fn description(&self) -> String;

    /// Run the check once
    async fn run(&self) -> Result<Outcome, Failure>;
}
