// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polls for clipboard content changes by hashing the current contents
//! against a cursor. The platform read is behind a small trait so tests
//! never need a real clipboard.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devlog_core::Event;
use devlog_storage::StateStore;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::contracts::{InstallContext, Module, ModuleError, Poller};

const COMPONENT: &str = "clipboard";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Platform clipboard read, abstracted so `ClipboardPoller` is testable
/// without a display server.
#[async_trait]
pub trait ClipboardSource: Send + Sync + 'static {
    async fn read(&self) -> Result<String, ModuleError>;
}

/// Reads via `pbpaste`/`xclip`-style platform tooling. Left thin and
/// macOS-shaped (`pbpaste`); other platforms are an install-time concern
/// per spec §1's "out of scope (external collaborators)" list.
pub struct SystemClipboardSource;

#[async_trait]
impl ClipboardSource for SystemClipboardSource {
    async fn read(&self) -> Result<String, ModuleError> {
        let output = Command::new("pbpaste")
            .output()
            .await
            .map_err(|e| ModuleError::Poll(format!("failed to read clipboard: {e}")))?;
        if !output.status.success() {
            return Err(ModuleError::Poll("pbpaste exited non-zero".to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

pub struct ClipboardModule {
    source: Arc<dyn ClipboardSource>,
}

impl ClipboardModule {
    pub fn new() -> Self {
        Self {
            source: Arc::new(SystemClipboardSource),
        }
    }

    pub fn with_source(source: Arc<dyn ClipboardSource>) -> Self {
        Self { source }
    }
}

impl Default for ClipboardModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for ClipboardModule {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn description(&self) -> &str {
        "polls the system clipboard for content changes"
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
        Ok(Some(Arc::new(ClipboardPoller {
            source: self.source.clone(),
            poll_interval: Duration::from_secs(poll_interval_secs),
            state,
        })))
    }
}

pub struct ClipboardPoller {
    source: Arc<dyn ClipboardSource>,
    poll_interval: Duration,
    state: Arc<StateStore>,
}

fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{digest:x}")
}

#[async_trait]
impl Poller for ClipboardPoller {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn poll(&self, _cancel: &CancellationToken) -> Result<Vec<Event>, ModuleError> {
        let content = self.source.read().await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let hash = content_hash(&content);
        let previous_hash = self
            .state
            .get(COMPONENT, "last_hash")
            .and_then(|v| v.as_str().map(str::to_string));

        if previous_hash.as_deref() == Some(hash.as_str()) {
            return Ok(Vec::new());
        }

        if let Err(e) = self.state.set(COMPONENT, "last_hash", json!(hash)) {
            tracing::warn!(error = %e, "failed to persist clipboard poller cursor");
        }

        let mut event = Event::new("clipboard", "capture");
        event.payload.insert("text".to_string(), json!(content));
        Ok(vec![event])
    }
}

#[cfg(test)]
#[path = "clipboard_tests.rs"]
mod tests;
