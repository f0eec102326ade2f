// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interface boundaries consumed from collaborators (spec §6.4).
//!
//! These traits are the seam between the core runtime and everything that
//! produces or consumes events. Modules and plugins never reach into the
//! runtime directly; they only see an [`InstallContext`] at
//! install/uninstall time and a [`tokio_util::sync::CancellationToken`] at
//! run time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devlog_core::Event;
use devlog_storage::StateStore;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("install failed: {0}")]
    Install(String),
    #[error("uninstall failed: {0}")]
    Uninstall(String),
    #[error("config invalid: {0}")]
    Validation(String),
    #[error("poll failed: {0}")]
    Poll(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error("plugin start failed: {0}")]
    Start(String),
    #[error("service injection failed: {0}")]
    ServiceInjection(String),
}

/// Passed to `install`/`uninstall`. Collaborators that need to write hook
/// scripts, wrapper binaries, or config fragments get everything they need
/// to do that here rather than reaching into global state.
pub struct InstallContext {
    pub home_dir: PathBuf,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub interactive: bool,
}

impl InstallContext {
    /// Log a line tagged with the calling component; collaborators use
    /// this instead of `println!` so install output is capturable in
    /// tests and consistent with the daemon's own logging.
    pub fn log(&self, args: std::fmt::Arguments<'_>) {
        tracing::info!(target: "devlog::install", "{}", args);
    }
}

/// A component that produces events, optionally on a schedule.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    async fn install(&self, ctx: &InstallContext) -> Result<(), ModuleError>;
    async fn uninstall(&self, ctx: &InstallContext) -> Result<(), ModuleError>;

    fn default_config(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }
    fn validate_config(&self, _cfg: &Value) -> Result<(), ModuleError> {
        Ok(())
    }

    /// `Some` if this module is pollable. Called once per (re)start with
    /// the component's current sub-config; `state` is the shared
    /// per-module cursor store (spec §3.4/§4.D) and `data_dir` the root
    /// data directory for any collaborator-owned files.
    fn create_poller(
        &self,
        _cfg: &Value,
        _state: Arc<StateStore>,
        _data_dir: &std::path::Path,
    ) -> Result<Option<Arc<dyn Poller>>, ModuleError> {
        Ok(None)
    }

    /// `Some` if this module contributes an ingest-time filter (spec
    /// §6.4: "the shell module ... supplies a filter").
    fn ingest_filter(&self) -> Option<Arc<dyn IngestFilter>> {
        None
    }
}

/// A periodic producer created by a pollable [`Module`].
#[async_trait]
pub trait Poller: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn poll_interval(&self) -> Duration;

    async fn poll(&self, cancel: &CancellationToken) -> Result<Vec<Event>, ModuleError>;

    async fn init(&self) -> Result<(), ModuleError> {
        Ok(())
    }

    fn should_retry_on_error(&self, _err: &ModuleError) -> bool {
        true
    }
}

/// A predicate applied to events at the ingest boundary before storage.
/// `true` means "keep"; `false` means "drop silently".
pub trait IngestFilter: Send + Sync + 'static {
    fn should_capture(&self, event: &Event, config: &Value) -> bool;
}

/// Accumulated provider -> object snapshot, handed to every
/// [`ServiceInjector`] once all providers in dependency order have run.
pub type ServiceMap = HashMap<String, Arc<dyn std::any::Any + Send + Sync>>;

/// Optional plugin capability: runs once after install-lookup, before
/// `start`.
#[async_trait]
pub trait Initializable: Send + Sync {
    async fn initialize(&self) -> Result<(), PluginError>;
}

/// Optional plugin capability: contributes named services for other
/// plugins to consume.
pub trait ServiceProvider: Send + Sync {
    fn services(&self) -> ServiceMap;
}

/// Optional plugin capability: consumes the service snapshot assembled
/// from every registered [`ServiceProvider`].
pub trait ServiceInjector: Send + Sync {
    fn inject_services(&self, services: &ServiceMap) -> Result<(), PluginError>;
}

#[derive(Debug, Clone)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    pub dependencies: Vec<String>,
}

/// A long-running collaborator that consumes events via storage.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    async fn install(&self, ctx: &InstallContext) -> Result<(), PluginError>;
    async fn uninstall(&self, ctx: &InstallContext) -> Result<(), PluginError>;

    fn default_config(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }
    fn validate_config(&self, _cfg: &Value) -> Result<(), PluginError> {
        Ok(())
    }

    fn metadata(&self) -> PluginMetadata;

    /// Runs until `cancel` fires or the plugin decides to return on its
    /// own (the runtime never restarts a plugin that returns by itself;
    /// spec §4.H: "Do *not* auto-restart").
    async fn start(&self, config: Value, cancel: CancellationToken) -> Result<(), PluginError>;

    /// Capability-polymorphism accessors (spec §4.H / §9): a plugin that
    /// implements one of these optional traits overrides the matching
    /// accessor to expose itself; the runtime never needs to know the
    /// plugin's concrete type to probe for a capability.
    fn as_initializable(&self) -> Option<&dyn Initializable> {
        None
    }
    fn as_service_provider(&self) -> Option<&dyn ServiceProvider> {
        None
    }
    fn as_service_injector(&self) -> Option<&dyn ServiceInjector> {
        None
    }
}
