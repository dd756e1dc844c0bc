// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use vigil_core::Severity;
use vigil_daemon::JobSummary;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

/// Label shown in the STATUS column
pub fn severity_label(severity: Option<Severity>) -> &'static str {
    match severity {
        None => "pending",
        Some(Severity::Ok) => "ok",
        Some(Severity::Warning) => "warning",
        Some(Severity::Critical) => "critical",
        Some(Severity::Raised) => "raised",
    }
}

/// Render the JOB STATUS table, one row per job, detail cut to its first line
pub fn status_table(jobs: &[JobSummary]) -> String {
    let width = jobs
        .iter()
        .map(|j| j.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("JOB".len());

    let mut out = format!(
        "{:<width$}  {:<8}  {:<19}  DETAIL\n",
        "JOB",
        "STATUS",
        "LAST RUN",
        width = width
    );
    for job in jobs {
        let last_run = job
            .last_run_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let detail = job.detail.lines().next().unwrap_or("").trim_end();
        let row = format!(
            "{:<width$}  {:<8}  {:<19}  {}",
            job.name,
            severity_label(job.severity),
            last_run,
            detail,
            width = width
        );
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
