// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `devlog search` — full-text search over stored events.

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::{ClientError, DaemonClient};
use crate::output::{print_events, OutputFormat};
use crate::paths::Paths;

#[derive(Args)]
pub struct SearchArgs {
    /// Query string ("*" or empty matches everything)
    pub query: String,
    /// Only consider events newer than this (e.g. "2h", "3d")
    #[arg(long)]
    pub since: Option<String>,
    /// Maximum number of results
    #[arg(long, default_value = "10")]
    pub limit: u32,
}

pub async fn handle(args: SearchArgs, paths: &Paths, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::discover(paths);
    match client
        .search(&args.query, args.since.as_deref(), args.limit)
        .await
    {
        Ok(events) => print_events(&events, format),
        Err(ClientError::DaemonNotRunning) => {
            println!("devlogd not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("{e}")),
    }
}
