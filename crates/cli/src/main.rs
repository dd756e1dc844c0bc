// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vigil - service monitoring CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod completions;
mod error;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{check, daemon, run, status};

use crate::completions::CompletionsArgs;
use crate::error::VigilError;

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "Vigil - scheduled service checks with failure tolerance and alerting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the jobs of a configuration in the foreground
    Run(run::RunArgs),
    /// Validate a configuration file
    Check(check::CheckArgs),
    /// Show the last result of every job of a running daemon
    Status(status::StatusArgs),
    /// Daemon management
    Daemon(daemon::DaemonArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        match e.downcast_ref::<VigilError>() {
            Some(err) => eprint!("{}", err),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::handle(args).await,
        Commands::Check(args) => check::handle(args),
        Commands::Status(args) => status::handle(args).await,
        Commands::Daemon(args) => daemon::handle(args).await,
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            Ok(())
        }
    }
}
