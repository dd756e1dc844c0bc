// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use fs2::FileExt;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};
use vigil_core::{Manager, ManagerError};

use crate::config::{ConfigError, VigilConfig};

/// Startup marker prefix written to the log before anything else.
/// The CLI uses it to find where the current startup attempt begins.
/// Full format: "--- vigild: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- vigild: starting (pid: ";

/// Paths used by one daemon instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Canonical path of the configuration file
    pub config_path: PathBuf,
    /// Per-instance state directory
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
}

impl Config {
    /// Paths for the daemon serving `config_file`, from the environment
    pub fn for_config_file(config_file: &Path) -> Result<Self, LifecycleError> {
        Self::with_dirs(config_file, &state_dir()?, &socket_dir()?)
    }

    /// Paths for the daemon serving `config_file` under explicit directories
    pub fn with_dirs(
        config_file: &Path,
        state_root: &Path,
        socket_dir: &Path,
    ) -> Result<Self, LifecycleError> {
        let canonical = config_file
            .canonicalize()
            .map_err(|e| LifecycleError::ConfigNotFound(config_file.to_path_buf(), e))?;

        let hash = config_hash(&canonical);
        let state_dir = state_root.join("daemons").join(&hash);

        Ok(Self {
            config_path: canonical,
            socket_path: socket_dir.join(format!("{}.sock", hash)),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            state_dir,
        })
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub listener: UnixListener,
    pub manager: Manager,
    pub start_time: Instant,
    /// Set by an IPC `Shutdown` request
    pub shutdown_requested: bool,
}

impl DaemonState {
    /// Stop the manager and remove runtime files.
    ///
    /// A heartbeat already in flight is allowed to finish first.
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        match self.manager.stop().await {
            Ok(()) | Err(ManagerError::NotRunning) => {}
            Err(e) => return Err(e.into()),
        }

        for (label, path) in [
            ("socket", &self.config.socket_path),
            ("PID", &self.config.lock_path),
            ("version", &self.config.version_path),
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove {} file: {}", label, e);
                }
            }
        }

        // Lock is released when self.lock_file is dropped
        info!("Daemon shutdown complete");
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Configuration not found at {0}: {1}")]
    ConfigNotFound(PathBuf, std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manager error: {0}")]
    Manager(#[from] ManagerError),
}

/// Start the daemon: lock, load configuration, bind socket, start the manager
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Lock FIRST; another daemon's files are never touched after a lost race
    let lock_file = acquire_lock(&config.lock_path)?;

    match startup_locked(config, lock_file).await {
        Ok(state) => Ok(state),
        Err(e) => {
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

fn acquire_lock(path: &Path) -> Result<File, LifecycleError> {
    let mut lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

async fn startup_locked(config: &Config, lock_file: File) -> Result<DaemonState, LifecycleError> {
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // Load configuration BEFORE binding socket (fail fast)
    let vigil = VigilConfig::load(&config.config_path)?;
    let manager = vigil.build_manager()?;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    manager.start().await?;

    info!(
        jobs = manager.jobs_len(),
        "Daemon started for configuration: {}",
        config.config_path.display()
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        manager,
        start_time: Instant::now(),
        shutdown_requested: false,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.version_path, &config.lock_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Append the startup marker to the log file
pub fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write a startup error synchronously so the CLI sees it even if the
/// process exits before the non-blocking log writer flushes.
pub fn write_startup_error(config: &Config, error: &LifecycleError) {
    let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

/// State directory: `VIGIL_STATE_DIR`, else `$XDG_STATE_HOME/vigil`, else
/// `~/.local/state/vigil`
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("VIGIL_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("vigil"));
    }

    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/vigil"))
}

/// Socket directory
///
/// Uses /tmp/vigil by default to keep paths short (macOS SUN_LEN = 104).
/// Can be overridden with VIGIL_SOCKET_DIR.
pub fn socket_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("VIGIL_SOCKET_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(PathBuf::from("/tmp/vigil"))
}

/// First 16 hex chars of the SHA-256 of the canonical config path
fn config_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let result = hasher.finalize();
    result[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
