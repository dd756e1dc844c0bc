// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil status <config> [--watch SECS]` - Show the last result of every job

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use vigil_daemon::Config;

use crate::client::{ClientError, DaemonClient};
use crate::error::VigilError;
use crate::output::{print_json, status_table, OutputFormat};

#[derive(Args)]
pub struct StatusArgs {
    /// Configuration file the daemon was started with
    pub config: PathBuf,

    /// Refresh every SECS seconds until interrupted
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub watch: Option<u64>,

    #[arg(long, short, value_enum, default_value_t)]
    pub output: OutputFormat,
}

pub async fn handle(args: StatusArgs) -> Result<()> {
    let config = Config::for_config_file(&args.config)?;
    let client = match DaemonClient::connect(&config) {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning) => {
            return Err(VigilError::daemon_not_running(&args.config).into())
        }
        Err(e) => return Err(e.into()),
    };

    let Some(secs) = args.watch else {
        return show(&client, args.output).await;
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                show(&client, args.output).await?;
                println!();
            }
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}

async fn show(client: &DaemonClient, output: OutputFormat) -> Result<()> {
    let report = client.status().await?;
    match output {
        OutputFormat::Json => print_json(&report.jobs),
        OutputFormat::Text => {
            if !report.running {
                println!("Manager: stopped");
            }
            print!("{}", status_table(&report.jobs));
        }
    }
    Ok(())
}
