// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polls a configured repository's commit log, emitting `source=git,
//! type=commit` events for anything newer than the last seen commit.
//! Shells out to `git log` rather than parsing `.git` internals directly,
//! the same "shell out, parse line-oriented output" idiom the teacher
//! uses for `tmux.rs`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devlog_core::Event;
use devlog_storage::StateStore;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::contracts::{InstallContext, Module, ModuleError, Poller};

const COMPONENT: &str = "git";
const FIELD_SEP: &str = "\x1f";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const LOG_WINDOW: &str = "100";

pub struct GitModule;

impl GitModule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GitModule {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GitConfig {
    repo_path: String,
    branch: Option<String>,
    #[serde(default = "default_poll_interval")]
    poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

#[async_trait]
impl Module for GitModule {
    fn name(&self) -> &str {
        "git"
    }

    fn description(&self) -> &str {
        "polls a repository's commit log"
    }

    async fn install(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    fn default_config(&self) -> Value {
        json!({ "repo_path": ".", "poll_interval_secs": DEFAULT_POLL_INTERVAL_SECS })
    }

    fn validate_config(&self, cfg: &Value) -> Result<(), ModuleError> {
        serde_json::from_value::<GitConfig>(cfg.clone())
            .map(|_| ())
            .map_err(|e| ModuleError::Validation(e.to_string()))
    }

    fn create_poller(
        &self,
        cfg: &Value,
        state: Arc<StateStore>,
        _data_dir: &Path,
    ) -> Result<Option<Arc<dyn Poller>>, ModuleError> {
        let cfg: GitConfig = serde_json::from_value(cfg.clone())
            .map_err(|e| ModuleError::Validation(e.to_string()))?;
        Ok(Some(Arc::new(GitPoller {
            repo_path: PathBuf::from(cfg.repo_path),
            branch: cfg.branch,
            poll_interval: Duration::from_secs(cfg.poll_interval_secs.max(1)),
            state,
        })))
    }
}

pub struct GitPoller {
    repo_path: PathBuf,
    branch: Option<String>,
    poll_interval: Duration,
    state: Arc<StateStore>,
}

#[async_trait]
impl Poller for GitPoller {
    fn name(&self) -> &str {
        "git"
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn poll(&self, _cancel: &CancellationToken) -> Result<Vec<Event>, ModuleError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .arg("log")
            .arg(format!("--format=%H{FIELD_SEP}%s{FIELD_SEP}%cI"))
            .arg("-n")
            .arg(LOG_WINDOW)
            .output()
            .await
            .map_err(|e| ModuleError::Poll(format!("failed to spawn git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ModuleError::Poll(format!("git log failed: {stderr}")));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let last_hash = self
            .state
            .get(COMPONENT, "last_commit_hash")
            .and_then(|v| v.as_str().map(str::to_string));

        let mut fresh = Vec::new();
        for line in stdout.lines() {
            let mut parts = line.splitn(3, FIELD_SEP);
            let (Some(hash), Some(subject), Some(committed_at)) =
                (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            if last_hash.as_deref() == Some(hash) {
                break;
            }
            fresh.push((hash.to_string(), subject.to_string(), committed_at.to_string()));
        }

        if let Some((newest_hash, _, _)) = fresh.first() {
            if let Err(e) = self.state.set(COMPONENT, "last_commit_hash", json!(newest_hash)) {
                tracing::warn!(error = %e, "failed to persist git poller cursor");
            }
        }

        let repo = self.repo_path.to_string_lossy().to_string();
        let events = fresh
            .into_iter()
            .rev()
            .map(|(hash, subject, _committed_at)| {
                let mut event = Event::new("git", "commit");
                event.repo = Some(repo.clone());
                event.branch = self.branch.clone();
                event.payload.insert("hash".to_string(), json!(hash));
                event.payload.insert("subject".to_string(), json!(subject));
                event
            })
            .collect();

        Ok(events)
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
