// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted state layout (spec §6.3): `~/.config/devlog/` for
//! configuration, `~/.local/share/devlog/` for everything else.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

#[derive(Debug, Clone)]
pub struct Paths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,
    pub db_path: PathBuf,
    pub queue_dir: PathBuf,
    pub state_path: PathBuf,
}

impl Paths {
    /// Resolve the user-level path layout. `DEVLOG_STATE_DIR`, when set,
    /// overrides both `config_dir` and `data_dir` with the same directory
    /// so integration tests can run fully isolated from a real user's
    /// `~/.config`/`~/.local/share`.
    pub fn discover() -> Result<Self, LifecycleError> {
        let (config_dir, data_dir) = if let Ok(dir) = std::env::var("DEVLOG_STATE_DIR") {
            let dir = PathBuf::from(dir);
            (dir.clone(), dir)
        } else {
            (
                dirs::config_dir()
                    .ok_or(LifecycleError::NoStateDir)?
                    .join("devlog"),
                dirs::data_dir()
                    .ok_or(LifecycleError::NoStateDir)?
                    .join("devlog"),
            )
        };

        Ok(Self {
            config_path: config_dir.join("config.yaml"),
            pid_path: config_dir.join("devlogd.pid"),
            log_path: data_dir.join("devlogd.log"),
            db_path: data_dir.join("events.db"),
            queue_dir: data_dir.join("queue"),
            state_path: data_dir.join("poller_state.json"),
            config_dir,
            data_dir,
        })
    }
}
