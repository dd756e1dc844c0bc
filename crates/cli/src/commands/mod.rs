// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod check;
pub mod daemon;
pub mod run;
pub mod status;

use crate::error::VigilError;
use std::path::Path;
use vigil_daemon::VigilConfig;

/// Load a configuration file, mapping failures to a user-facing error
pub fn load_config(path: &Path) -> Result<VigilConfig, VigilError> {
    VigilConfig::load(path).map_err(|e| VigilError::invalid_config(path, e))
}
