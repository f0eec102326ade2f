// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin dependency ordering, startup, and lifecycle (spec §4.H).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use devlog_adapters::{Plugin, PluginError, ServiceMap};
use devlog_core::DevLogError;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::metrics::Metrics;
use crate::registries::PluginRegistry;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PluginRuntimeError {
    #[error(transparent)]
    Graph(#[from] DevLogError),
    #[error("plugin '{0}' is not registered")]
    NotFound(String),
    #[error("plugin '{0}' failed to initialize: {1}")]
    Initialize(String, PluginError),
    #[error("plugin '{0}' failed to inject services: {1}")]
    ServiceInjection(String, PluginError),
    #[error("plugin '{0}' did not stop within {SHUTDOWN_TIMEOUT:?}")]
    ShutdownTimeout(String),
}

/// A running plugin's task handle plus its own cancellation token, so a
/// single plugin's `Stop`/`Restart` diff doesn't need to touch its
/// dependents.
pub struct PluginInstance {
    pub cancel: CancellationToken,
    pub handle: JoinHandle<()>,
    pub plugin: Arc<dyn Plugin>,
    pub restarts: u32,
}

/// Owns every currently-running plugin, the dependency graph used to order
/// startup, and the accumulated `ServiceMap` so a plugin started in a later
/// diff can still see services a dependency registered when it started.
pub struct PluginRuntime {
    registry: Arc<PluginRegistry>,
    parent_cancel: CancellationToken,
    instances: Mutex<HashMap<String, PluginInstance>>,
    services: Mutex<ServiceMap>,
    metrics: Option<Arc<Metrics>>,
}

impl PluginRuntime {
    pub fn new(registry: Arc<PluginRegistry>, parent_cancel: CancellationToken) -> Self {
        Self {
            registry,
            parent_cancel,
            instances: Mutex::new(HashMap::new()),
            services: Mutex::new(HashMap::new()),
            metrics: None,
        }
    }

    /// Report plugin starts/errors/restarts to `metrics` (spec §4.L).
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Start every plugin named in `enabled`, in dependency order: resolve
    /// the graph, `initialize()` each plugin in order, fold every
    /// `ServiceProvider`'s services into the runtime-wide map, inject that
    /// map into every `ServiceInjector`, then spawn in order (spec §4.H,
    /// §4.I). A dependency is satisfied if it's in `enabled` or already
    /// running; anything else is unmet, since an uninstantiated dependency
    /// can never have serviced a `ServiceInjector`.
    ///
    /// This is the one plugin-start pipeline: bootstrap passes every
    /// enabled plugin at once, a config-diff `Start`/`Restart` passes just
    /// the plugins that diff turned on, and either way the ordering and
    /// wiring are the same.
    pub async fn start_all(&self, enabled: &[(String, Value)]) -> Result<(), PluginRuntimeError> {
        let names: Vec<String> = enabled.iter().map(|(n, _)| n.clone()).collect();
        let order = self.topo_sort(&names)?;

        // Build the concrete plugin set, looked up once, in graph order.
        let mut plugins = Vec::with_capacity(order.len());
        for name in &order {
            let plugin = self
                .registry
                .get(name)
                .map_err(|_| PluginRuntimeError::NotFound(name.clone()))?;
            plugins.push((name.clone(), plugin));
        }

        for (name, plugin) in &plugins {
            if let Some(initializable) = plugin.as_initializable() {
                initializable
                    .initialize()
                    .await
                    .map_err(|e| PluginRuntimeError::Initialize(name.clone(), e))?;
            }
        }

        {
            let mut services = self.services.lock();
            for (_, plugin) in &plugins {
                if let Some(provider) = plugin.as_service_provider() {
                    services.extend(provider.services());
                }
            }
        }

        let services = self.services.lock().clone();
        for (name, plugin) in &plugins {
            if let Some(injector) = plugin.as_service_injector() {
                injector
                    .inject_services(&services)
                    .map_err(|e| PluginRuntimeError::ServiceInjection(name.clone(), e))?;
            }
        }

        let configs: HashMap<&str, &Value> =
            enabled.iter().map(|(n, c)| (n.as_str(), c)).collect();
        for (name, plugin) in plugins {
            let config = configs.get(name.as_str()).cloned().cloned().unwrap_or(Value::Null);
            self.spawn(name, plugin, config);
        }

        Ok(())
    }

    /// Start a single plugin through the same ordering/init/injection
    /// pipeline as [`Self::start_all`], treating it as a one-plugin batch.
    pub async fn start_plugin(&self, name: &str, config: Value) -> Result<(), PluginRuntimeError> {
        self.start_all(&[(name.to_string(), config)]).await
    }

    fn spawn(&self, name: String, plugin: Arc<dyn Plugin>, config: Value) {
        let cancel = self.parent_cancel.child_token();
        let task_cancel = cancel.clone();
        let task_plugin = plugin.clone();
        let task_name = name.clone();
        let task_metrics = self.metrics.clone();

        if let Some(metrics) = &self.metrics {
            metrics.record_plugin_start(&name);
        }

        let handle = tokio::spawn(async move {
            if let Err(e) = task_plugin.start(config, task_cancel).await {
                tracing::error!(plugin = %task_name, error = %e, "plugin exited with an error");
                if let Some(metrics) = &task_metrics {
                    metrics.record_plugin_error(&task_name, e.to_string());
                }
            }
        });

        let restarts = self
            .instances
            .lock()
            .get(&name)
            .map(|i| i.restarts)
            .unwrap_or(0);

        self.instances.lock().insert(
            name,
            PluginInstance {
                cancel,
                handle,
                plugin,
                restarts,
            },
        );
    }

    /// Cancel the named plugin's token and wait up to
    /// [`SHUTDOWN_TIMEOUT`] for its task to return.
    pub async fn stop_plugin(&self, name: &str) -> Result<(), PluginRuntimeError> {
        let instance = self.instances.lock().remove(name);
        let Some(instance) = instance else {
            return Ok(());
        };
        instance.cancel.cancel();
        tokio::time::timeout(SHUTDOWN_TIMEOUT, instance.handle)
            .await
            .map_err(|_| PluginRuntimeError::ShutdownTimeout(name.to_string()))?
            .ok();
        Ok(())
    }

    /// Stop then start, tracking the restart count (spec §4.L: per-plugin
    /// `restarts`).
    pub async fn restart_plugin(&self, name: &str, config: Value) -> Result<(), PluginRuntimeError> {
        let previous_restarts = self.instances.lock().get(name).map(|i| i.restarts).unwrap_or(0);
        self.stop_plugin(name).await?;
        self.start_plugin(name, config).await?;
        self.note_restart(name, previous_restarts + 1);
        Ok(())
    }

    /// Record that `name` has just been restarted: bump its restart
    /// counter and report it to metrics (spec §4.L). Callers that batch
    /// several plugins' `Start` halves through [`Self::start_all`] call
    /// this once the batch has spawned, instead of going through
    /// [`Self::restart_plugin`] one plugin at a time.
    pub fn note_restart(&self, name: &str, restarts: u32) {
        if let Some(instance) = self.instances.lock().get_mut(name) {
            instance.restarts = restarts;
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_plugin_restart(name);
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.instances.lock().contains_key(name)
    }

    pub fn restart_count(&self, name: &str) -> u32 {
        self.instances.lock().get(name).map(|i| i.restarts).unwrap_or(0)
    }

    /// Three-colour DFS topological sort over `names`' `metadata().dependencies`
    /// (spec §4.H). A dependency already running counts as satisfied without
    /// re-entering the graph, so a later diff can start a plugin whose
    /// dependency came up in an earlier one; anything else outside `names`
    /// is unmet. A back-edge within the recursion stack is a cycle.
    fn topo_sort(&self, names: &[String]) -> Result<Vec<String>, DevLogError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Colour {
            White,
            Grey,
            Black,
        }

        let running: HashSet<String> = self.instances.lock().keys().cloned().collect();
        let present: HashSet<&str> = names
            .iter()
            .map(|s| s.as_str())
            .chain(running.iter().map(|s| s.as_str()))
            .collect();
        let mut colour: HashMap<String, Colour> =
            names.iter().map(|n| (n.clone(), Colour::White)).collect();
        let mut order = Vec::with_capacity(names.len());

        fn visit(
            name: &str,
            registry: &PluginRegistry,
            present: &HashSet<&str>,
            colour: &mut HashMap<String, Colour>,
            stack: &mut Vec<String>,
            order: &mut Vec<String>,
        ) -> Result<(), DevLogError> {
            match colour.get(name).copied() {
                Some(Colour::Black) | None => return Ok(()),
                Some(Colour::Grey) => {
                    let mut cycle = stack.clone();
                    cycle.push(name.to_string());
                    return Err(DevLogError::Cycle(cycle));
                }
                Some(Colour::White) => {}
            }

            colour.insert(name.to_string(), Colour::Grey);
            stack.push(name.to_string());

            let plugin = registry
                .get(name)
                .map_err(|_| DevLogError::NotFound(name.to_string()))?;
            for dependency in &plugin.metadata().dependencies {
                if !present.contains(dependency.as_str()) {
                    return Err(DevLogError::UnmetDependency {
                        plugin: name.to_string(),
                        dependency: dependency.clone(),
                    });
                }
                visit(dependency, registry, present, colour, stack, order)?;
            }

            stack.pop();
            colour.insert(name.to_string(), Colour::Black);
            order.push(name.to_string());
            Ok(())
        }

        let mut stack = Vec::new();
        for name in names {
            visit(name, &self.registry, &present, &mut colour, &mut stack, &mut order)?;
        }

        Ok(order)
    }
}

#[cfg(test)]
#[path = "plugin_runtime_tests.rs"]
mod tests;
