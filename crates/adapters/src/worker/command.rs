// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell command check using the plugin exit-code convention
//!
//! Exit 0 is OK, 1 is Warning, 2 is Critical. Any other exit code is
//! Critical with the code as the outcome state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use vigil_core::{Failure, Outcome, Worker};

/// Longest output kept in the detailed message
const MAX_OUTPUT: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub command: String,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CommandConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            timeout: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandWorker {
    config: CommandConfig,
}

impl CommandWorker {
    pub fn new(config: CommandConfig) -> Self {
        Self { config }
    }
}

/// Map an exit code to an outcome
pub fn outcome_for_exit(code: i32) -> Outcome {
    match code {
        0 => Outcome::ok(0),
        1 => Outcome::warning(1),
        code => Outcome::critical(code),
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_OUTPUT {
        let mut end = MAX_OUTPUT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[async_trait]
impl Worker for CommandWorker {
    fn description(&self) -> String {
        self.config
            .description
            .clone()
            .unwrap_or_else(|| format!("Command `{}`", self.config.command))
    }

    async fn run(&self) -> Result<Outcome, Failure> {
        let mut command = Command::new("sh");
        command.arg("-c").arg(&self.config.command).kill_on_drop(true);
        if let Some(cwd) = &self.config.cwd {
            command.current_dir(cwd);
        }

        let output = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    Failure::timeout(format!(
                        "`{}` did not finish within {}",
                        self.config.command,
                        humantime::format_duration(limit)
                    ))
                })?,
            None => command.output().await,
        }
        .map_err(|e| Failure::io(&e))?;

        let Some(code) = output.status.code() else {
            return Err(Failure::new(
                "signal",
                format!("`{}` was terminated by a signal", self.config.command),
            ));
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let detail = if stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            stdout
        };

        Ok(outcome_for_exit(code)
            .with_short_message(self.description())
            .with_detailed_message(truncate(detail)))
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
