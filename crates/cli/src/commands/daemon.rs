// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `devlog daemon` — start/stop/status for the background `devlogd` process.

use anyhow::{anyhow, Result};
use clap::Subcommand;

use crate::client::{ClientError, DaemonClient};
use crate::daemon_process;
use crate::paths::Paths;

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start devlogd in the background, if it isn't already running
    Start,
    /// Stop the running devlogd
    Stop,
    /// Report whether devlogd is running
    Status,
}

pub async fn handle(command: DaemonCommand, paths: &Paths) -> Result<()> {
    match command {
        DaemonCommand::Start => start(paths).await,
        DaemonCommand::Stop => stop(paths),
        DaemonCommand::Status => status(paths).await,
    }
}

async fn start(paths: &Paths) -> Result<()> {
    if let Some(pid) = daemon_process::read_pid(paths) {
        if daemon_process::process_exists(pid) {
            println!("devlogd already running (pid: {pid})");
            return Ok(());
        }
    }

    let mut child = daemon_process::start_background()?;

    for _ in 0..100 {
        if let Ok(Some(status)) = child.try_wait() {
            return Err(anyhow!("devlogd exited immediately with status: {status}"));
        }
        let client = DaemonClient::discover(paths);
        if client.status().await.is_ok() {
            println!("devlogd started");
            return Ok(());
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    Err(anyhow!("devlogd did not become ready in time"))
}

fn stop(paths: &Paths) -> Result<()> {
    if daemon_process::stop(paths)? {
        println!("devlogd stopped");
    } else {
        println!("devlogd not running");
    }
    Ok(())
}

async fn status(paths: &Paths) -> Result<()> {
    let client = DaemonClient::discover(paths);
    match client.status().await {
        Ok(status) => {
            println!("Status: running");
            println!("Events: {}", status.event_count);
            println!("Uptime: {}s", status.uptime_seconds);
        }
        Err(ClientError::DaemonNotRunning) => println!("devlogd not running"),
        Err(e) => return Err(anyhow!("{e}")),
    }
    Ok(())
}
