// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `devlog status` — tail the N most recent events, optionally by source.

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::{ClientError, DaemonClient};
use crate::output::{print_events, OutputFormat};
use crate::paths::Paths;

#[derive(Args)]
pub struct StatusArgs {
    /// Number of recent events to show
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: u32,
    /// Restrict to a single event source
    #[arg(short = 's', long)]
    pub source: Option<String>,
}

pub async fn handle(args: StatusArgs, paths: &Paths, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::discover(paths);
    match client.recent(args.limit, args.source.as_deref()).await {
        Ok(events) => print_events(&events, format),
        Err(ClientError::DaemonNotRunning) => {
            println!("devlogd not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("{e}")),
    }
}
