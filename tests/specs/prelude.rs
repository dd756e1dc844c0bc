//! Shared helpers for CLI specs.
//!
//! Every `Project` gets its own temp directory used both as the working
//! directory and as the daemon state/socket directory, so specs never touch
//! the user's real daemons.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub use similar_asserts::assert_eq;

/// Upper bound for polling in specs
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// A config with one quick job that logs its results
pub const MINIMAL_CONFIG: &str = r#"
[manager]
heartbeat = "100ms"

[[job]]
name = "echo"
worker = { kind = "command", command = "echo all good" }
schedule = [{ kind = "fixed_interval", every = "1h" }]
notify = [{ kind = "log" }]
"#;

pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(max_ms) {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

pub struct Project {
    dir: tempfile::TempDir,
    state: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            state: tempfile::tempdir().unwrap(),
        }
    }

    /// A project with `vigil.toml` holding `MINIMAL_CONFIG`
    pub fn minimal() -> Self {
        let project = Self::empty();
        project.file("vigil.toml", MINIMAL_CONFIG);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn vigil(&self) -> CliBuilder {
        let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin("vigil"));
        cmd.current_dir(self.dir.path())
            .env("VIGIL_STATE_DIR", self.state.path())
            .env("VIGIL_SOCKET_DIR", self.state.path())
            .env("VIGIL_DAEMON_BINARY", assert_cmd::cargo::cargo_bin("vigild"))
            .env("VIGIL_TIMEOUT_CONNECT_MS", SPEC_WAIT_MAX_MS.to_string())
            .env_remove("RUST_LOG");
        CliBuilder { cmd }
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        // Stop any daemon a spec left running
        if self.dir.path().join("vigil.toml").exists() {
            let _ = self
                .vigil()
                .args(&["daemon", "stop", "vigil.toml"])
                .cmd
                .output();
        }
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        RunAssert(self.cmd.assert().success())
    }

    pub fn fails(mut self) -> RunAssert {
        RunAssert(self.cmd.assert().failure())
    }
}

pub struct RunAssert(assert_cmd::assert::Assert);

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.0.get_output().stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.0.get_output().stderr).to_string()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        Self(self.0.stdout(predicates::str::contains(expected)))
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self(self.0.stderr(predicates::str::contains(expected)))
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        use predicates::prelude::*;
        Self(self.0.stdout(predicates::str::contains(unexpected).not()))
    }

    pub fn stderr_lacks(self, unexpected: &str) -> Self {
        use predicates::prelude::*;
        Self(self.0.stderr(predicates::str::contains(unexpected).not()))
    }
}
