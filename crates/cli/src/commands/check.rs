// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil check <config>` - Validate a configuration file

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use vigil_core::Job;

use super::load_config;
use crate::error::VigilError;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct CheckArgs {
    /// Configuration file
    pub config: PathBuf,

    #[arg(long, short, value_enum, default_value_t)]
    pub output: OutputFormat,
}

/// What a built job consists of
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutline {
    pub name: String,
    pub schedules: usize,
    pub notifiers: usize,
    pub ignore_rules: usize,
}

impl From<&Job> for JobOutline {
    fn from(job: &Job) -> Self {
        Self {
            name: job.name().to_string(),
            schedules: job.schedules().len(),
            notifiers: job.notifier_count(),
            ignore_rules: job.rules().len(),
        }
    }
}

impl std::fmt::Display for JobOutline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} schedule(s), {} notifier(s), {} ignore rule(s)",
            self.name, self.schedules, self.notifiers, self.ignore_rules
        )
    }
}

#[derive(Serialize)]
struct CheckReport {
    config: PathBuf,
    heartbeat: String,
    global_ignore_rules: usize,
    jobs: Vec<JobOutline>,
}

pub fn handle(args: CheckArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let jobs = config
        .build_jobs()
        .map_err(|e| VigilError::invalid_config(&args.config, e))?;
    let outlines: Vec<JobOutline> = jobs.iter().map(JobOutline::from).collect();
    let manager = config
        .manager_for(jobs)
        .map_err(|e| VigilError::invalid_config(&args.config, e))?;

    let report = CheckReport {
        config: args.config,
        heartbeat: humantime::format_duration(manager.heartbeat_interval()).to_string(),
        global_ignore_rules: manager.global_rules().snapshot().len(),
        jobs: outlines,
    };

    match args.output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            println!("Configuration OK: {}", report.config.display());
            println!("Heartbeat: {}", report.heartbeat);
            println!("Global ignore rules: {}", report.global_ignore_rules);
            println!("Jobs: {}", report.jobs.len());
            for job in &report.jobs {
                println!("  {}", job);
            }
        }
    }
    Ok(())
}
