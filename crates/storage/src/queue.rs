// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The filesystem-backed offline queue (spec §3.3 / §4.C).
//!
//! One JSON file per pending event, file-stem = event id, written
//! temp-then-rename for crash safety (the same atomic-write idiom used by
//! the state store and the config substrate).

use std::path::{Path, PathBuf};

use devlog_core::Event;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("event not found in queue: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("validation failed: {0}")]
    Validation(String),
}

pub struct OfflineQueue {
    dir: PathBuf,
}

impl OfflineQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, QueueError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Validate and write `event` atomically.
    pub fn enqueue(&self, event: &Event) -> Result<(), QueueError> {
        event
            .validate()
            .map_err(|e| QueueError::Validation(e.to_string()))?;

        let bytes = event
            .to_json()
            .map_err(|e| QueueError::Validation(e.to_string()))?;

        let final_path = self.path_for(&event.id);
        let tmp_path = self.dir.join(format!("{}.json.tmp", event.id));
        std::fs::write(&tmp_path, &bytes)?;
        std::fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// Enumerate all well-formed queued events. Malformed entries are
    /// skipped (logged) but not deleted — out-of-band garbage collection
    /// is the caller's concern (spec §4.C).
    pub fn list(&self) -> Result<Vec<Event>, QueueError> {
        let mut events = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read(&path) {
                Ok(bytes) => match Event::from_json(&bytes) {
                    Ok(event) => events.push(event),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping malformed queue entry"),
                },
                Err(e) => warn!(path = %path.display(), error = %e, "failed to read queue entry"),
            }
        }
        Ok(events)
    }

    /// Delete the queued file for `id`. Absence is an error (spec §4.C).
    pub fn remove(&self, id: &str) -> Result<(), QueueError> {
        let path = self.path_for(id);
        std::fs::remove_file(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                QueueError::NotFound(id.to_string())
            } else {
                QueueError::Io(e)
            }
        })
    }

    /// Remove every queued file.
    pub fn clear(&self) -> Result<(), QueueError> {
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                std::fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
