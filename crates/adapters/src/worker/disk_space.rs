// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Free disk space check across one or more mount points

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vigil_core::{Failure, Outcome, Severity, Worker};

pub const STATE_OK: i32 = 0;
pub const STATE_WARNING_PERCENT: i32 = 1;
pub const STATE_CRITICAL_PERCENT: i32 = 2;
pub const STATE_WARNING_GB: i32 = 3;
pub const STATE_CRITICAL_GB: i32 = 4;

const GIGABYTE: f64 = 1_073_741_824.0;

/// Thresholds are inclusive: a volume at exactly the limit trips it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_warning_percent")]
    pub warning_percent_free: f64,
    #[serde(default = "default_critical_percent")]
    pub critical_percent_free: f64,
    #[serde(default)]
    pub warning_gb_free: f64,
    #[serde(default)]
    pub critical_gb_free: f64,
}

fn default_warning_percent() -> f64 {
    20.0
}

fn default_critical_percent() -> f64 {
    5.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_percent_free: default_warning_percent(),
            critical_percent_free: default_critical_percent(),
            warning_gb_free: 0.0,
            critical_gb_free: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskSpaceConfig {
    pub paths: Vec<PathBuf>,
    #[serde(flatten)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub description: Option<String>,
}

/// Verdict for one volume
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeReport {
    pub severity: Severity,
    pub state: i32,
    pub line: String,
}

/// Classify a single volume's free space
pub fn classify_volume(name: &str, free: u64, total: u64, thresholds: &Thresholds) -> VolumeReport {
    let percent = if total == 0 {
        0.0
    } else {
        free as f64 / total as f64 * 100.0
    };
    let gb = free as f64 / GIGABYTE;

    let (severity, state, line) = if percent <= thresholds.critical_percent_free {
        (
            Severity::Critical,
            STATE_CRITICAL_PERCENT,
            format!("CRITICAL: {} has only {:.1}% free space ({:.1} GB)", name, percent, gb),
        )
    } else if gb <= thresholds.critical_gb_free {
        (
            Severity::Critical,
            STATE_CRITICAL_GB,
            format!("CRITICAL: {} has only {:.1} GB free ({:.1}%)", name, gb, percent),
        )
    } else if percent <= thresholds.warning_percent_free {
        (
            Severity::Warning,
            STATE_WARNING_PERCENT,
            format!("Warning: {} has only {:.1}% free space ({:.1} GB)", name, percent, gb),
        )
    } else if gb <= thresholds.warning_gb_free {
        (
            Severity::Warning,
            STATE_WARNING_GB,
            format!("Warning: {} has only {:.1} GB free ({:.1}%)", name, gb, percent),
        )
    } else {
        (
            Severity::Ok,
            STATE_OK,
            format!("OK: {} has {:.1}% free space ({:.1} GB)", name, percent, gb),
        )
    };
    VolumeReport {
        severity,
        state,
        line,
    }
}

/// Fold per-volume reports into one outcome.
///
/// A critical volume always sets the state; a warning only does so while
/// nothing worse has been seen.
pub fn combine(reports: &[VolumeReport]) -> Outcome {
    let mut severity = Severity::Ok;
    let mut state = STATE_OK;
    for report in reports {
        match report.severity {
            Severity::Critical => {
                severity = Severity::Critical;
                state = report.state;
            }
            Severity::Warning if severity == Severity::Ok => {
                severity = Severity::Warning;
                state = report.state;
            }
            _ => {}
        }
    }
    let detail = reports
        .iter()
        .map(|r| r.line.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Outcome::new(state, severity).with_detailed_message(detail)
}

#[derive(Debug, Clone)]
pub struct DiskSpaceWorker {
    config: DiskSpaceConfig,
}

impl DiskSpaceWorker {
    pub fn new(config: DiskSpaceConfig) -> Self {
        Self { config }
    }

    fn measure(config: &DiskSpaceConfig) -> Result<Vec<VolumeReport>, Failure> {
        config
            .paths
            .iter()
            .map(|path| {
                let free = fs2::available_space(path).map_err(|e| io_failure(path, &e))?;
                let total = fs2::total_space(path).map_err(|e| io_failure(path, &e))?;
                Ok(classify_volume(
                    &path.display().to_string(),
                    free,
                    total,
                    &config.thresholds,
                ))
            })
            .collect()
    }
}

fn io_failure(path: &std::path::Path, err: &std::io::Error) -> Failure {
    let mut failure = Failure::io(err);
    failure.message = format!("{}: {}", path.display(), failure.message);
    failure
}

#[async_trait]
impl Worker for DiskSpaceWorker {
    fn description(&self) -> String {
        self.config.description.clone().unwrap_or_else(|| {
            let paths: Vec<String> = self
                .config
                .paths
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            format!("Disk space on {}", paths.join(", "))
        })
    }

    async fn run(&self) -> Result<Outcome, Failure> {
        let config = self.config.clone();
        let reports = tokio::task::spawn_blocking(move || Self::measure(&config))
            .await
            .map_err(|e| Failure::new("io", format!("disk probe task failed: {}", e)))??;
        Ok(combine(&reports).with_short_message(self.description()))
    }
}

#[cfg(test)]
#[path = "disk_space_tests.rs"]
mod tests;
