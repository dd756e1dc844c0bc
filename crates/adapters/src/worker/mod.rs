// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete workers and their configuration

mod command;
mod disk_space;
mod http;

pub use command::{outcome_for_exit, CommandConfig, CommandWorker};
pub use disk_space::{
    classify_volume, combine, DiskSpaceConfig, DiskSpaceWorker, Thresholds, VolumeReport,
};
pub use http::{HttpMethod, HttpWorker, HttpWorkerConfig};

/// State codes reported by each worker
pub mod states {
    pub mod http {
        pub use crate::worker::http::{
            STATE_CRITICAL_STATUS, STATE_CRITICAL_TIME, STATE_OK, STATE_WARNING_TIME,
        };
    }
    pub mod disk_space {
        pub use crate::worker::disk_space::{
            STATE_CRITICAL_GB, STATE_CRITICAL_PERCENT, STATE_OK, STATE_WARNING_GB,
            STATE_WARNING_PERCENT,
        };
    }
}

use crate::traced::TracedWorker;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vigil_core::Worker;

/// Worker variants, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerConfig {
    Http(HttpWorkerConfig),
    DiskSpace(DiskSpaceConfig),
    Command(CommandConfig),
}

impl WorkerConfig {
    /// Build the worker, wrapped for tracing
    pub fn build(&self) -> Arc<dyn Worker> {
        match self {
            WorkerConfig::Http(config) => Arc::new(TracedWorker::new(HttpWorker::new(config.clone()))),
            WorkerConfig::DiskSpace(config) => {
                Arc::new(TracedWorker::new(DiskSpaceWorker::new(config.clone())))
            }
            WorkerConfig::Command(config) => {
                Arc::new(TracedWorker::new(CommandWorker::new(config.clone())))
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
