// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil run <config>` - Run the jobs in the foreground until Ctrl-C

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::check::JobOutline;
use super::load_config;
use crate::error::VigilError;

#[derive(Args)]
pub struct RunArgs {
    /// Configuration file
    pub config: PathBuf,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    setup_logging();

    let config = load_config(&args.config)?;
    let jobs = config
        .build_jobs()
        .map_err(|e| VigilError::invalid_config(&args.config, e))?;

    println!("Loaded {} job(s) from {}", jobs.len(), args.config.display());
    for job in &jobs {
        println!("  {}", JobOutline::from(job));
    }

    let manager = config
        .manager_for(jobs)
        .map_err(|e| VigilError::invalid_config(&args.config, e))?;

    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    manager.start().await?;
    println!(
        "Running (heartbeat {}), press Ctrl-C to stop",
        humantime::format_duration(manager.heartbeat_interval())
    );

    stop_rx.recv().await;
    eprintln!("\nStopping...");
    manager.stop().await?;

    println!("Stopped");
    Ok(())
}

/// Log to stderr, `RUST_LOG` overriding the default `info`
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
