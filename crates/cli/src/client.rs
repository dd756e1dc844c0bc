// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::net::UnixStream;
use vigil_daemon::protocol::{self, JobSummary, ProtocolError};
use vigil_daemon::{Config, LifecycleError, Request, Response, STARTUP_MARKER_PREFIX};

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests (hello, status, shutdown)
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("VIGIL_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("VIGIL_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("VIGIL_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("VIGIL_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Daemon status as reported over the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub uptime: Duration,
    pub running: bool,
    pub jobs: Vec<JobSummary>,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to an existing daemon (no auto-start)
    pub fn connect(config: &Config) -> Result<Self, ClientError> {
        if !config.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }

        Ok(Self {
            socket_path: config.socket_path.clone(),
        })
    }

    fn connect_with_retry(
        config: &Config,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // Check if daemon process exited early (startup failure)
            if let Ok(Some(status)) = child.try_wait() {
                // Poll for startup error in log (filesystem may need to sync)
                let poll_start = Instant::now();
                while poll_start.elapsed() < timeout_exit() {
                    if let Some(err) = read_startup_error(config) {
                        return Err(ClientError::DaemonStartFailed(err));
                    }
                    std::thread::sleep(poll_interval());
                }
                return Err(ClientError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            match Self::connect(config) {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    std::thread::sleep(poll_interval());
                }
                Err(e) => return Err(wrap_with_startup_error(e, config)),
            }
        }

        Err(wrap_with_startup_error(
            ClientError::DaemonStartTimeout,
            config,
        ))
    }

    /// Send a request and receive a response with specific timeouts
    async fn send_with_timeout(
        &self,
        request: Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(&request)?;
        tokio::time::timeout(write_timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(read_timeout, protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        let response: Response = protocol::decode(&response_bytes)?;
        Ok(response)
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(Request::Ping).await? {
            Response::Pong => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get the daemon's protocol version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        match self
            .send(Request::Hello {
                version: protocol::PROTOCOL_VERSION.to_string(),
            })
            .await?
        {
            Response::Hello { version } => Ok(version),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get daemon status and the last result of every job
    pub async fn status(&self) -> Result<StatusReport, ClientError> {
        match self.send(Request::Status).await? {
            Response::Status {
                uptime_secs,
                running,
                jobs,
            } => Ok(StatusReport {
                uptime: Duration::from_secs(uptime_secs),
                running,
                jobs,
            }),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Start the daemon for `config` in the background and wait for its socket
pub fn daemon_start(config: &Config) -> Result<DaemonClient, ClientError> {
    let child = start_daemon_background(&config.config_path)?;
    DaemonClient::connect_with_retry(config, timeout_connect(), child)
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background(config_file: &Path) -> Result<std::process::Child, ClientError> {
    let vigild_path = find_vigild_binary();

    Command::new(&vigild_path)
        .arg(config_file)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if daemon was stopped, false if it wasn't running
pub async fn daemon_stop(config: &Config) -> Result<bool, ClientError> {
    let client = match DaemonClient::connect(config) {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            cleanup_stale_pid(config);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let shutdown_result = client.shutdown().await;

    if let Some(pid) = read_daemon_pid(config) {
        if shutdown_result.is_ok() {
            wait_for_exit(pid, timeout_exit()).await;
        }

        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    cleanup_stale_pid(config);
    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the vigild binary
fn find_vigild_binary() -> PathBuf {
    // Explicit override (used by tests to ensure correct binary)
    if let Ok(path) = std::env::var("VIGIL_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("vigild");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("vigild")
}

/// Remove a PID file left behind by a daemon that is gone.
fn cleanup_stale_pid(config: &Config) {
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Get the PID from the daemon PID file, if it exists
pub fn read_daemon_pid(config: &Config) -> Option<u32> {
    std::fs::read_to_string(&config.lock_path)
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
}

/// Package version recorded by the daemon at startup
pub fn read_daemon_version(config: &Config) -> Option<String> {
    std::fs::read_to_string(&config.version_path)
        .ok()
        .map(|content| content.trim().to_string())
        .filter(|version| !version.is_empty())
}

/// Whether the recorded daemon version differs from this CLI's
pub fn version_mismatch(config: &Config) -> bool {
    read_daemon_version(config).is_some_and(|version| version != env!("CARGO_PKG_VERSION"))
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // kill -0 checks existence without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Read the daemon log from the last startup marker, looking for errors.
pub fn read_startup_error(config: &Config) -> Option<String> {
    let content = std::fs::read_to_string(&config.log_path).ok()?;
    startup_error_in(&content)
}

fn startup_error_in(log: &str) -> Option<String> {
    let start_pos = log.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &log[start_pos..];

    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .collect();

    if errors.is_empty() {
        return None;
    }

    // Format: "timestamp LEVEL target: message"; keep the message part
    let error_messages: Vec<String> = errors
        .iter()
        .filter_map(|line| line.split_once(": ").map(|(_, msg)| msg.to_string()))
        .collect();

    if error_messages.is_empty() {
        Some(errors.join("\n"))
    } else {
        Some(error_messages.join("\n"))
    }
}

/// Prefer the error from the daemon log when there is one.
fn wrap_with_startup_error(err: ClientError, config: &Config) -> ClientError {
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    match read_startup_error(config) {
        Some(startup_error) => ClientError::DaemonStartFailed(startup_error),
        None => err,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
