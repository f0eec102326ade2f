// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polls `tmux list-panes` and diffs against the previous poll's pane set
//! (cursor in the state store) to emit open/close events. Same
//! `tokio::process::Command` idiom as the teacher's `TmuxAdapter::spawn`.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devlog_core::Event;
use devlog_storage::StateStore;
use serde_json::{json, Value};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::contracts::{InstallContext, Module, ModuleError, Poller};

const COMPONENT: &str = "tmux";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

pub struct TmuxModule;

impl TmuxModule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TmuxModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for TmuxModule {
    fn name(&self) -> &str {
        "tmux"
    }

    fn description(&self) -> &str {
        "polls tmux pane open/close transitions"
    }

    async fn install(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    fn default_config(&self) -> Value {
        json!({ "poll_interval_secs": DEFAULT_POLL_INTERVAL_SECS })
    }

    fn create_poller(
        &self,
        cfg: &Value,
        state: Arc<StateStore>,
        _data_dir: &Path,
    ) -> Result<Option<Arc<dyn Poller>>, ModuleError> {
        let poll_interval_secs = cfg
            .get("poll_interval_secs")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(1);
        Ok(Some(Arc::new(TmuxPoller {
            poll_interval: Duration::from_secs(poll_interval_secs),
            state,
        })))
    }
}

pub struct TmuxPoller {
    poll_interval: Duration,
    state: Arc<StateStore>,
}

async fn list_panes() -> Result<BTreeSet<String>, ModuleError> {
    let output = Command::new("tmux")
        .args(["list-panes", "-a", "-F", "#{pane_id}"])
        .output()
        .await
        .map_err(|e| ModuleError::Poll(format!("failed to spawn tmux: {e}")))?;

    // tmux exits non-zero with "no server running" when nothing is up;
    // treat that as an empty pane set rather than an error.
    if !output.status.success() {
        return Ok(BTreeSet::new());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().map(str::to_string).collect())
}

#[async_trait]
impl Poller for TmuxPoller {
    fn name(&self) -> &str {
        "tmux"
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn poll(&self, _cancel: &CancellationToken) -> Result<Vec<Event>, ModuleError> {
        let current = list_panes().await?;

        let previous: BTreeSet<String> = self
            .state
            .get(COMPONENT, "panes")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        let events = diff_panes(&current, &previous);

        if current != previous {
            if let Err(e) = self.state.set(COMPONENT, "panes", json!(current)) {
                tracing::warn!(error = %e, "failed to persist tmux poller cursor");
            }
        }

        Ok(events)
    }
}

fn diff_panes(current: &BTreeSet<String>, previous: &BTreeSet<String>) -> Vec<Event> {
    let mut events = Vec::new();
    for pane in current.difference(previous) {
        let mut event = Event::new("tmux", "pane_open");
        event.payload.insert("pane_id".to_string(), json!(pane));
        events.push(event);
    }
    for pane in previous.difference(current) {
        let mut event = Event::new("tmux", "pane_close");
        event.payload.insert("pane_id".to_string(), json!(pane));
        events.push(event);
    }
    events
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
