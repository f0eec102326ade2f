// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies a [`ConfigDiff`] against the live registries/scheduler/plugin
//! runtime (spec §4.I).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use devlog_adapters::ModuleError;
use devlog_config::{ComponentChange, ComponentKind, ConfigDiff, ConfigDocument};
use devlog_storage::StateStore;
use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::plugin_runtime::{PluginRuntime, PluginRuntimeError};
use crate::registries::{RegistryError, Registries};
use crate::scheduler::{PollerHandle, PollerScheduler};

#[derive(Debug, Error)]
pub enum DiffDriverError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Plugin(#[from] PluginRuntimeError),
    #[error("module '{0}' has no entry in the new config document")]
    MissingModuleConfig(String),
    #[error("plugin '{0}' has no entry in the new config document")]
    MissingPluginConfig(String),
}

/// Everything `apply_diff` needs, held across the daemon's lifetime so
/// repeated config reloads act on the same running pollers.
pub struct DiffContext {
    pub registries: Arc<Registries>,
    pub scheduler: Arc<PollerScheduler>,
    pub plugin_runtime: Arc<PluginRuntime>,
    pub state: Arc<StateStore>,
    pub data_dir: PathBuf,
    /// Parent of every poller token this context spawns, so the daemon's
    /// own shutdown cancels every live poller without this context
    /// needing to enumerate them.
    root_cancel: CancellationToken,
    pollers: Mutex<HashMap<String, PollerHandle>>,
}

impl DiffContext {
    pub fn new(
        registries: Arc<Registries>,
        scheduler: Arc<PollerScheduler>,
        plugin_runtime: Arc<PluginRuntime>,
        state: Arc<StateStore>,
        data_dir: PathBuf,
        root_cancel: CancellationToken,
    ) -> Self {
        Self {
            registries,
            scheduler,
            plugin_runtime,
            state,
            data_dir,
            root_cancel,
            pollers: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_poller(&self, name: &str) -> bool {
        self.pollers.lock().contains_key(name)
    }
}

/// Drive every change in `diff` against `ctx`. `old`/`new` are the
/// documents the diff was computed from; `http.port` differences are
/// logged but never hot-applied (spec §4.I: "the HTTP listener binds
/// once at startup").
///
/// Plugin `Stop`s (and a `Restart`'s stop half) run as they're encountered,
/// but every `Start` (and a `Restart`'s start half) is staged and run
/// together as a single batch through [`PluginRuntime::start_all`] once the
/// whole diff has been walked, so plugins that depend on each other start
/// in dependency order regardless of the order they appear in `diff.changes`
/// (spec §4.H, §4.I).
pub async fn apply_diff(
    ctx: &DiffContext,
    old: &ConfigDocument,
    new: &ConfigDocument,
    diff: &ConfigDiff,
) -> Result<(), DiffDriverError> {
    if old.http.port != new.http.port {
        tracing::warn!(
            old_port = old.http.port,
            new_port = new.http.port,
            "http.port changed but requires a daemon restart to take effect"
        );
    }

    let mut plugin_starts: Vec<(String, serde_json::Value)> = Vec::new();
    let mut plugin_restarts: Vec<(String, u32)> = Vec::new();

    for (kind, name, change) in &diff.changes {
        match kind {
            ComponentKind::Module => apply_module_change(ctx, new, name, change).await?,
            ComponentKind::Plugin => {
                stage_plugin_change(ctx, new, name, change, &mut plugin_starts, &mut plugin_restarts)
                    .await?
            }
        }
    }

    if !plugin_starts.is_empty() {
        ctx.plugin_runtime.start_all(&plugin_starts).await?;
    }
    for (name, restarts) in plugin_restarts {
        ctx.plugin_runtime.note_restart(&name, restarts);
    }

    Ok(())
}

async fn apply_module_change(
    ctx: &DiffContext,
    new: &ConfigDocument,
    name: &str,
    change: &ComponentChange,
) -> Result<(), DiffDriverError> {
    match change {
        ComponentChange::Start => start_module(ctx, new, name).await,
        ComponentChange::Stop => {
            stop_module(ctx, name).await;
            Ok(())
        }
        ComponentChange::Restart => {
            stop_module(ctx, name).await;
            start_module(ctx, new, name).await
        }
    }
}

async fn start_module(ctx: &DiffContext, new: &ConfigDocument, name: &str) -> Result<(), DiffDriverError> {
    let cfg = new
        .modules
        .get(name)
        .ok_or_else(|| DiffDriverError::MissingModuleConfig(name.to_string()))?;
    let module = ctx.registries.modules.get(name)?;

    match module.create_poller(&cfg.extra, ctx.state.clone(), &ctx.data_dir)? {
        Some(poller) => {
            let handle = ctx.scheduler.spawn(poller, &ctx.root_cancel);
            ctx.pollers.lock().insert(name.to_string(), handle);
        }
        None => {
            tracing::debug!(module = name, "module is not pollable, nothing to schedule");
        }
    }
    Ok(())
}

async fn stop_module(ctx: &DiffContext, name: &str) {
    let handle = ctx.pollers.lock().remove(name);
    if let Some(handle) = handle {
        handle.stop().await;
    }
}

/// Handle one plugin's change: `Stop` (and a `Restart`'s stop half) take
/// effect immediately; `Start` (and a `Restart`'s start half) are staged
/// into `starts` for `apply_diff` to run as one dependency-ordered batch.
async fn stage_plugin_change(
    ctx: &DiffContext,
    new: &ConfigDocument,
    name: &str,
    change: &ComponentChange,
    starts: &mut Vec<(String, serde_json::Value)>,
    restarts: &mut Vec<(String, u32)>,
) -> Result<(), DiffDriverError> {
    match change {
        ComponentChange::Start => {
            let cfg = new
                .plugins
                .get(name)
                .ok_or_else(|| DiffDriverError::MissingPluginConfig(name.to_string()))?;
            starts.push((name.to_string(), cfg.extra.clone()));
            Ok(())
        }
        ComponentChange::Stop => {
            ctx.plugin_runtime.stop_plugin(name).await?;
            Ok(())
        }
        ComponentChange::Restart => {
            let cfg = new
                .plugins
                .get(name)
                .ok_or_else(|| DiffDriverError::MissingPluginConfig(name.to_string()))?;
            let previous_restarts = ctx.plugin_runtime.restart_count(name);
            ctx.plugin_runtime.stop_plugin(name).await?;
            starts.push((name.to_string(), cfg.extra.clone()));
            restarts.push((name.to_string(), previous_restarts + 1));
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "diff_driver_tests.rs"]
mod tests;
