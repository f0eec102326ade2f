// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Four process-wide, name-keyed registries (spec §4.F). Populated once
//! at process initialisation (the entrypoint's `register_all`) and
//! treated as read-only thereafter (spec §5 "registries: publish-once at
//! init").

use std::collections::HashMap;
use std::sync::Arc;

use devlog_adapters::{IngestFilter, Module, Plugin};
use devlog_core::Event;
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("'{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("'{0}' not found")]
    NotFound(String),
}

/// A name-keyed table of `T`, safe for concurrent reads after
/// registration is done.
pub struct NamedRegistry<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T: Clone> NamedRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, name: impl Into<String>, value: T) -> Result<(), RegistryError> {
        let name = name.into();
        let mut entries = self.entries.write();
        if entries.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        entries.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<T, RegistryError> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Snapshot of all entries; spec §4.F: "no ordering guarantee".
    pub fn list(&self) -> Vec<(String, T)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }
}

impl<T: Clone> Default for NamedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type ModuleRegistry = NamedRegistry<Arc<dyn Module>>;
pub type PluginRegistry = NamedRegistry<Arc<dyn Plugin>>;
pub type IngestHandlerRegistry = NamedRegistry<Arc<dyn IngestFilter>>;

/// A pure, I/O-free per-source event renderer (spec §4.M).
pub type Formatter = Arc<dyn Fn(&Event) -> String + Send + Sync>;
pub type FormatterRegistry = NamedRegistry<Formatter>;

/// Bundles all four registries so the entrypoint builds one object and
/// hands it to every subsystem that needs to look components up. Each
/// table is held behind its own `Arc` so collaborators that only need one
/// table (e.g. [`crate::plugin_runtime::PluginRuntime`]) can hold a clone
/// of it independently of the rest of the bundle.
#[derive(Default)]
pub struct Registries {
    pub modules: Arc<ModuleRegistry>,
    pub plugins: Arc<PluginRegistry>,
    pub ingest_handlers: Arc<IngestHandlerRegistry>,
    pub formatters: Arc<FormatterRegistry>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[path = "registries_tests.rs"]
mod tests;
