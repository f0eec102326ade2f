// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-poller scheduling loop (spec §4.G).

use std::sync::Arc;
use std::time::Duration;

use devlog_adapters::Poller;
use devlog_storage::{StorageEngine, StorageError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const INSERT_TIMEOUT: Duration = Duration::from_secs(5);

/// A running poller task; dropping this without calling [`Self::stop`]
/// leaves the task running (it only stops on cancellation or process
/// exit).
pub struct PollerHandle {
    name: String,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal the poller's dedicated token and wait for its task to
    /// return.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}

/// Spawns and runs poller tasks against a shared storage engine.
pub struct PollerScheduler {
    storage: Arc<StorageEngine>,
}

impl PollerScheduler {
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Spawn `poller` as a child of `parent_cancel`: cancelling the
    /// parent (daemon shutdown) stops every poller, but each poller also
    /// gets its own token so a single module's `Stop`/`Restart` diff
    /// doesn't need to touch anyone else's.
    pub fn spawn(&self, poller: Arc<dyn Poller>, parent_cancel: &CancellationToken) -> PollerHandle {
        let cancel = parent_cancel.child_token();
        let name = poller.name().to_string();
        let storage = self.storage.clone();
        let task_cancel = cancel.clone();

        let join = tokio::spawn(async move {
            run_poller(poller, storage, task_cancel).await;
        });

        PollerHandle { name, cancel, join }
    }
}

async fn run_poller(poller: Arc<dyn Poller>, storage: Arc<StorageEngine>, cancel: CancellationToken) {
    if let Err(e) = poller.init().await {
        tracing::error!(poller = poller.name(), error = %e, "poller init failed");
        return;
    }

    loop {
        if cancel.is_cancelled() {
            return;
        }

        match tokio::time::timeout(POLL_TIMEOUT, poller.poll(&cancel)).await {
            Ok(Ok(events)) => {
                for event in events {
                    insert_with_timeout(&storage, event).await;
                }
            }
            Ok(Err(e)) => {
                if cancel.is_cancelled() {
                    tracing::debug!(poller = poller.name(), error = %e, "poll failed during shutdown");
                } else {
                    tracing::error!(poller = poller.name(), error = %e, "poll failed");
                }
                if !poller.should_retry_on_error(&e) {
                    return;
                }
            }
            Err(_) => {
                tracing::error!(poller = poller.name(), "poll timed out after {POLL_TIMEOUT:?}");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(poller.poll_interval()) => {}
        }
    }
}

async fn insert_with_timeout(storage: &Arc<StorageEngine>, event: devlog_core::Event) {
    let storage = storage.clone();
    let event_id = event.id.clone();
    let result = tokio::time::timeout(
        INSERT_TIMEOUT,
        tokio::task::spawn_blocking(move || storage.insert(&event)),
    )
    .await;

    match result {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(StorageError::DuplicateId(id)))) => {
            tracing::debug!(id, "duplicate event id, skipping");
        }
        Ok(Ok(Err(e))) => {
            tracing::error!(id = event_id, error = %e, "event insert failed");
        }
        Ok(Err(join_err)) => {
            tracing::error!(id = event_id, error = %join_err, "insert task panicked");
        }
        Err(_) => {
            tracing::error!(id = event_id, "insert timed out after {INSERT_TIMEOUT:?}");
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
