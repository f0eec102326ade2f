// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake collaborators for other crates' tests, gated the same way the
//! teacher exposes `Fake*Adapter` types (`test-support` feature or
//! `cfg(test)`).

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devlog_core::Event;
use devlog_storage::StateStore;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::contracts::{
    InstallContext, Module, ModuleError, Plugin, PluginError, PluginMetadata, Poller,
};

/// A module whose only purpose is to hand back a [`FakePoller`], for
/// scheduler tests (spec §8 scenario S5).
pub struct FakeModule {
    pub poll_interval: Duration,
}

impl FakeModule {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

#[async_trait]
impl Module for FakeModule {
    fn name(&self) -> &str {
        "fake"
    }
    fn description(&self) -> &str {
        "test fixture module"
    }
    async fn install(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }
    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }
    fn create_poller(
        &self,
        _cfg: &Value,
        _state: Arc<StateStore>,
        _data_dir: &Path,
    ) -> Result<Option<Arc<dyn Poller>>, ModuleError> {
        Ok(Some(Arc::new(FakePoller::new(self.poll_interval))))
    }
}

/// Emits one event per poll call and counts how many times it was
/// invoked; tests assert on the counter rather than timing directly.
pub struct FakePoller {
    interval: Duration,
    calls: AtomicU64,
}

impl FakePoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            calls: AtomicU64::new(0),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Poller for FakePoller {
    fn name(&self) -> &str {
        "fake"
    }
    fn poll_interval(&self) -> Duration {
        self.interval
    }
    async fn poll(&self, _cancel: &CancellationToken) -> Result<Vec<Event>, ModuleError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Event::new("fake", format!("poll-{n}"))])
    }
}

/// A poller that always fails, for scheduler error-path tests.
pub struct FailingPoller {
    interval: Duration,
}

impl FailingPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl Poller for FailingPoller {
    fn name(&self) -> &str {
        "failing"
    }
    fn poll_interval(&self) -> Duration {
        self.interval
    }
    async fn poll(&self, _cancel: &CancellationToken) -> Result<Vec<Event>, ModuleError> {
        Err(ModuleError::Poll("synthetic failure".to_string()))
    }
}

/// A plugin with a configurable dependency list and a run loop that just
/// waits for cancellation, for plugin-runtime topology/lifecycle tests.
pub struct FakePlugin {
    name: String,
    dependencies: Vec<String>,
    started: Arc<std::sync::atomic::AtomicBool>,
}

impl FakePlugin {
    pub fn new(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            dependencies,
            started: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Plugin for FakePlugin {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        "test fixture plugin"
    }
    async fn install(&self, _ctx: &InstallContext) -> Result<(), PluginError> {
        Ok(())
    }
    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), PluginError> {
        Ok(())
    }
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: self.name.clone(),
            description: self.description().to_string(),
            dependencies: self.dependencies.clone(),
        }
    }
    async fn start(&self, _config: Value, cancel: CancellationToken) -> Result<(), PluginError> {
        self.started.store(true, Ordering::SeqCst);
        cancel.cancelled().await;
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A plugin whose `start` returns an error immediately, for metrics /
/// error-recording tests.
pub struct FailingPlugin {
    name: String,
}

impl FailingPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Plugin for FailingPlugin {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        "test fixture plugin that always fails to start"
    }
    async fn install(&self, _ctx: &InstallContext) -> Result<(), PluginError> {
        Ok(())
    }
    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), PluginError> {
        Ok(())
    }
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: self.name.clone(),
            description: self.description().to_string(),
            dependencies: Vec::new(),
        }
    }
    async fn start(&self, _config: Value, _cancel: CancellationToken) -> Result<(), PluginError> {
        Err(PluginError::Start("synthetic failure".to_string()))
    }
}
