// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context, Result};
use devlog_config::ConfigSubstrate;

use crate::paths::Paths;

pub fn init(paths: &Paths) -> Result<()> {
    match ConfigSubstrate::init(&paths.config_path) {
        Ok(()) => {
            println!("Initialized config at {}", paths.config_path.display());
            Ok(())
        }
        Err(devlog_config::ConfigError::AlreadyInitialized(path)) => {
            println!("Config already exists at {}", path.display());
            Ok(())
        }
        Err(e) => Err(e).context("failed to initialize config"),
    }
}
