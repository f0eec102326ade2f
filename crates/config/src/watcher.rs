// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem watcher for the config document, debounced so a run of
//! saves from an editor collapses into a single reload (spec §4.E).

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

const DEBOUNCE: Duration = Duration::from_millis(500);
const POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to start filesystem watcher: {0}")]
    Notify(#[from] notify::Error),
}

/// Owns the underlying `notify` watcher and debounce thread. Dropping it
/// (or cancelling the token it was spawned with) stops watching.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    _handle: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Watch the parent directory of `config_path` and emit a `()` on the
    /// returned receiver each time `config_path` settles after a burst of
    /// writes. Exits its background thread once `cancel` fires.
    pub fn spawn(
        config_path: &Path,
        cancel: CancellationToken,
    ) -> Result<(Self, std_mpsc::Receiver<()>), WatcherError> {
        let watch_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let target = config_path.to_path_buf();

        let (raw_tx, raw_rx) = std_mpsc::channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = raw_tx.send(res);
        })?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        let (settled_tx, settled_rx) = std_mpsc::channel::<()>();
        let handle = std::thread::spawn(move || {
            debounce_loop(raw_rx, settled_tx, target, cancel);
        });

        Ok((
            Self {
                _watcher: watcher,
                _handle: handle,
            },
            settled_rx,
        ))
    }
}

fn debounce_loop(
    raw_rx: std_mpsc::Receiver<notify::Result<Event>>,
    settled_tx: std_mpsc::Sender<()>,
    target: PathBuf,
    cancel: CancellationToken,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        if cancel.is_cancelled() {
            return;
        }

        match raw_rx.recv_timeout(POLL) {
            Ok(Ok(event)) => {
                if event.paths.iter().any(|p| p == &target) {
                    deadline = Some(Instant::now() + DEBOUNCE);
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "config watcher error");
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }

        if let Some(d) = deadline {
            if Instant::now() >= d {
                deadline = None;
                if settled_tx.send(()).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
