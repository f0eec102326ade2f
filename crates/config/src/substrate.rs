// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load/save/validate/hot-reload-adjacent operations (spec §4.E).

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::diff::ComponentKind;
use crate::document::{ComponentConfig, ConfigDocument};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config already initialized at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("port {0} out of range (1024, 65535]")]
    PortOutOfRange(u16),
    #[error("{kind} '{name}' is not a registered component")]
    UnknownComponent { kind: &'static str, name: String },
    #[error("{kind} '{name}' failed validation: {reason}")]
    ComponentInvalid {
        kind: &'static str,
        name: String,
        reason: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config document: {0}")]
    Malformed(#[from] serde_yaml::Error),
}

/// Hook the diff-agnostic substrate uses to check a component's shape
/// without depending on the registries that know about it (avoids a
/// dependency cycle between devlog-config and devlog-runtime/adapters).
pub trait ComponentValidator {
    /// Whether a component with this name is registered at all.
    fn is_known(&self, kind: ComponentKind, name: &str) -> bool;

    /// Validate a specific component's free-form sub-config. Only called
    /// for entries with `enabled: true`.
    fn validate(&self, kind: ComponentKind, name: &str, extra: &Value) -> Result<(), String>;
}

/// A validator that accepts everything — useful for tests and for tools
/// that only need to read/write the document without a live registry.
pub struct PermissiveValidator;

impl ComponentValidator for PermissiveValidator {
    fn is_known(&self, _kind: ComponentKind, _name: &str) -> bool {
        true
    }
    fn validate(&self, _kind: ComponentKind, _name: &str, _extra: &Value) -> Result<(), String> {
        Ok(())
    }
}

pub struct ConfigSubstrate {
    path: PathBuf,
    doc: RwLock<ConfigDocument>,
}

impl ConfigSubstrate {
    /// Bootstrap the config directory and write a defaulted document.
    /// Refuses to overwrite an existing one (spec §4.E).
    pub fn init(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyInitialized(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let doc = ConfigDocument::default();
        let yaml = serde_yaml::to_string(&doc)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Load the document from `path`, applying defaults for a missing
    /// file, and validate every enabled entry. Unregistered entries are
    /// tolerated with a warning (spec §4.E: "this makes configs portable
    /// across binaries with different module sets").
    pub fn load(path: &Path, validator: &dyn ComponentValidator) -> Result<Self, ConfigError> {
        let doc = Self::read_document(path)?;
        validate_document(&doc, validator)?;
        Ok(Self {
            path: path.to_path_buf(),
            doc: RwLock::new(doc),
        })
    }

    fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
        if !path.exists() {
            return Ok(ConfigDocument::default());
        }
        let bytes = std::fs::read(path)?;
        Ok(serde_yaml::from_slice(&bytes)?)
    }

    /// Re-read and validate without replacing the live document; used by
    /// the watcher to build a candidate document before committing it
    /// (spec §4.E "Invalid new documents are logged and discarded").
    pub fn reload_candidate(&self, validator: &dyn ComponentValidator) -> Result<ConfigDocument, ConfigError> {
        let doc = Self::read_document(&self.path)?;
        validate_document(&doc, validator)?;
        Ok(doc)
    }

    /// Replace the live, in-memory document (called after the watcher's
    /// diff-and-apply succeeds).
    pub fn set_document(&self, doc: ConfigDocument) {
        *self.doc.write() = doc;
    }

    pub fn document(&self) -> ConfigDocument {
        self.doc.read().clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current document atomically (temp + rename).
    pub fn save(&self) -> Result<(), ConfigError> {
        let doc = self.doc.read();
        let yaml = serde_yaml::to_string(&*doc)?;
        let tmp = self.path.with_extension("yaml.tmp");
        std::fs::write(&tmp, yaml)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn is_enabled(&self, kind: ComponentKind, name: &str) -> bool {
        let doc = self.doc.read();
        let table = match kind {
            ComponentKind::Module => &doc.modules,
            ComponentKind::Plugin => &doc.plugins,
        };
        table.get(name).is_some_and(|c| c.enabled)
    }

    pub fn get_config(&self, kind: ComponentKind, name: &str) -> Option<ComponentConfig> {
        let doc = self.doc.read();
        let table = match kind {
            ComponentKind::Module => &doc.modules,
            ComponentKind::Plugin => &doc.plugins,
        };
        table.get(name).cloned()
    }

    pub fn set_enabled(&self, kind: ComponentKind, name: &str, enabled: bool) {
        let mut doc = self.doc.write();
        let table = match kind {
            ComponentKind::Module => &mut doc.modules,
            ComponentKind::Plugin => &mut doc.plugins,
        };
        table.entry(name.to_string()).or_default().enabled = enabled;
    }

    pub fn set_config(&self, kind: ComponentKind, name: &str, config: ComponentConfig) {
        let mut doc = self.doc.write();
        let table = match kind {
            ComponentKind::Module => &mut doc.modules,
            ComponentKind::Plugin => &mut doc.plugins,
        };
        table.insert(name.to_string(), config);
    }

    pub fn clear(&self, kind: ComponentKind) {
        let mut doc = self.doc.write();
        match kind {
            ComponentKind::Module => doc.modules.clear(),
            ComponentKind::Plugin => doc.plugins.clear(),
        }
    }
}

fn validate_document(
    doc: &ConfigDocument,
    validator: &dyn ComponentValidator,
) -> Result<(), ConfigError> {
    if !(1024 < doc.http.port) {
        return Err(ConfigError::PortOutOfRange(doc.http.port));
    }

    for (kind, table) in [
        (ComponentKind::Module, &doc.modules),
        (ComponentKind::Plugin, &doc.plugins),
    ] {
        for (name, cfg) in table {
            if !cfg.enabled {
                continue;
            }
            if !validator.is_known(kind, name) {
                tracing::warn!(kind = kind.label(), name, "unregistered component in config, ignoring");
                continue;
            }
            if let Err(reason) = validator.validate(kind, name, &cfg.extra) {
                return Err(ConfigError::ComponentInvalid {
                    kind: kind.label(),
                    name: name.clone(),
                    reason,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "substrate_tests.rs"]
mod tests;
