// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigil-daemon: configuration loading, daemon lifecycle and the status
//! protocol shared with the CLI

pub mod config;
pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use config::{ConfigError, JobConfig, ManagerSection, VigilConfig};
pub use lifecycle::{Config, LifecycleError, STARTUP_MARKER_PREFIX};
pub use protocol::{JobSummary, ProtocolError, Request, Response, PROTOCOL_VERSION};
