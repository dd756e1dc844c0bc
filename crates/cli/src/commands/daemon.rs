// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil daemon` - Manage the background daemon for a configuration file

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use vigil_daemon::Config;

use crate::client::{self, ClientError, DaemonClient};
use crate::error::VigilError;

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background
    Start {
        /// Configuration file
        config: PathBuf,
    },
    /// Stop the daemon
    Stop {
        /// Configuration file
        config: PathBuf,
    },
    /// Show whether the daemon is running
    Status {
        /// Configuration file
        config: PathBuf,
    },
    /// Print the daemon log
    Logs {
        /// Configuration file
        config: PathBuf,

        /// Number of trailing lines to show
        #[arg(long, short = 'n', default_value = "50")]
        lines: usize,
    },
}

pub async fn handle(args: DaemonArgs) -> Result<()> {
    match args.command {
        DaemonCommand::Start { config } => start(&config).await,
        DaemonCommand::Stop { config } => stop(&config).await,
        DaemonCommand::Status { config } => status(&config).await,
        DaemonCommand::Logs { config, lines } => logs(&config, lines),
    }
}

async fn start(config_file: &Path) -> Result<()> {
    // Validate before spawning so errors surface with full context
    super::load_config(config_file)?
        .build_jobs()
        .map_err(|e| VigilError::invalid_config(config_file, e))?;

    let config = Config::for_config_file(config_file)?;
    // A daemon from another release is replaced
    if client::version_mismatch(&config) {
        client::daemon_stop(&config).await?;
    }
    if let Ok(client) = DaemonClient::connect(&config) {
        if client.ping().await.is_ok() {
            println!("Daemon already running");
            return Ok(());
        }
    }

    let client = tokio::task::spawn_blocking(move || client::daemon_start(&config)).await??;
    client.ping().await?;
    println!("Daemon started");
    Ok(())
}

async fn stop(config_file: &Path) -> Result<()> {
    let config = Config::for_config_file(config_file)?;
    if client::daemon_stop(&config).await? {
        println!("Daemon stopped");
    } else {
        println!("Daemon not running");
    }
    Ok(())
}

async fn status(config_file: &Path) -> Result<()> {
    let config = Config::for_config_file(config_file)?;
    let client = match DaemonClient::connect(&config) {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning) => {
            println!("Daemon not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let protocol = match client.hello().await {
        Ok(protocol) => protocol,
        Err(ClientError::Io(_)) => {
            // Stale socket left by a daemon that died
            println!("Daemon not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let report = client.status().await?;

    println!("Status: running");
    println!("Config: {}", config.config_path.display());
    if let Some(pid) = client::read_daemon_pid(&config) {
        println!("PID: {}", pid);
    }
    println!(
        "Version: {}",
        client::read_daemon_version(&config).unwrap_or_else(|| "unknown".to_string())
    );
    println!("Protocol: {}", protocol);
    println!("Uptime: {}", humantime::format_duration(report.uptime));
    println!("Jobs: {}", report.jobs.len());
    if !report.running {
        println!("Manager: stopped");
    }
    Ok(())
}

fn logs(config_file: &Path, lines: usize) -> Result<()> {
    let config = Config::for_config_file(config_file)?;
    let content = match std::fs::read_to_string(&config.log_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No log at {}", config.log_path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let all: Vec<&str> = content.lines().collect();
    for line in &all[all.len().saturating_sub(lines)..] {
        println!("{}", line);
    }
    Ok(())
}
