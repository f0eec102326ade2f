// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `devlog ingest` — read one JSON event from stdin and deliver it,
//! falling back to the offline queue when devlogd isn't reachable
//! (spec §6.1 "falling back to the offline queue on connection failure").

use std::io::Read;

use anyhow::{Context, Result};
use devlog_core::Event;
use devlog_storage::OfflineQueue;

use crate::client::{ClientError, DaemonClient};
use crate::paths::Paths;

pub async fn handle(paths: &Paths) -> Result<()> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("failed to read event from stdin")?;
    let event = Event::from_json(&bytes).context("stdin did not contain a well-formed event")?;

    let client = DaemonClient::discover(paths);
    match client.ingest(&event).await {
        Ok(response) if response.filtered => {
            println!("filtered: {}", response.id);
            Ok(())
        }
        Ok(response) => {
            println!("ingested: {}", response.id);
            Ok(())
        }
        Err(ClientError::DaemonNotRunning) => {
            let queue = OfflineQueue::new(&paths.queue_dir)?;
            queue.enqueue(&event)?;
            println!("devlogd not running, queued: {}", event.id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
