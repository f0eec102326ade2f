// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `devlog config` — inspect the on-disk config document.

use anyhow::{Context, Result};
use clap::Subcommand;
use devlog_config::{ConfigSubstrate, PermissiveValidator};

use crate::paths::Paths;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved config document as YAML
    Show,
    /// Print the config file's path
    Path,
}

pub fn handle(command: ConfigCommand, paths: &Paths) -> Result<()> {
    match command {
        ConfigCommand::Show => show(paths),
        ConfigCommand::Path => {
            println!("{}", paths.config_path.display());
            Ok(())
        }
    }
}

fn show(paths: &Paths) -> Result<()> {
    let substrate = ConfigSubstrate::load(&paths.config_path, &PermissiveValidator)
        .context("failed to load config")?;
    let yaml = serde_yaml::to_string(&substrate.document()).context("failed to render config")?;
    print!("{yaml}");
    Ok(())
}
