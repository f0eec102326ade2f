// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path layout shared with `devlogd` (spec §6.3). Kept independent of the
//! `devlog-daemon` crate so the CLI doesn't pull in its HTTP/runtime stack.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathsError {
    #[error("could not determine a config/data directory for this platform")]
    NoStateDir,
}

#[derive(Debug, Clone)]
pub struct Paths {
    pub config_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,
    pub queue_dir: PathBuf,
}

impl Paths {
    /// `DEVLOG_STATE_DIR`, when set, overrides both directories — the same
    /// override `devlogd` honors, so the CLI and a test-spawned daemon agree
    /// on where everything lives.
    pub fn discover() -> Result<Self, PathsError> {
        let (config_dir, data_dir) = if let Ok(dir) = std::env::var("DEVLOG_STATE_DIR") {
            let dir = PathBuf::from(dir);
            (dir.clone(), dir)
        } else {
            (
                dirs::config_dir().ok_or(PathsError::NoStateDir)?.join("devlog"),
                dirs::data_dir().ok_or(PathsError::NoStateDir)?.join("devlog"),
            )
        };

        Ok(Self {
            config_path: config_dir.join("config.yaml"),
            pid_path: config_dir.join("devlogd.pid"),
            log_path: data_dir.join("devlogd.log"),
            queue_dir: data_dir.join("queue"),
        })
    }
}
