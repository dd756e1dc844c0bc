// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle errors for jobs and the manager
//!
//! These signal programming errors (calls out of order) and are returned
//! immediately rather than logged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job {0} is already initialized")]
    AlreadyInitialized(String),
    #[error("job {0} is not initialized")]
    NotInitialized(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("manager is already initialized")]
    AlreadyInitialized,
    #[error("manager is already running")]
    AlreadyRunning,
    #[error("manager is not running")]
    NotRunning,
    #[error("no tokio runtime available to drive the heartbeat")]
    NoRuntime,
    #[error(transparent)]
    Job(#[from] JobError),
}
