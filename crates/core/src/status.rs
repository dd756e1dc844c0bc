// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only job status snapshots

use crate::outcome::Severity;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Snapshot of a job's last outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub name: String,
    /// `None` until the job has run once
    pub severity: Option<Severity>,
    pub state: Option<i32>,
    pub short_message: String,
    pub detailed_message: String,
    pub last_run_at: Option<NaiveDateTime>,
}

impl JobStatus {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: None,
            state: None,
            short_message: String::new(),
            detailed_message: String::new(),
            last_run_at: None,
        }
    }

    pub fn has_run(&self) -> bool {
        self.last_run_at.is_some()
    }
}
