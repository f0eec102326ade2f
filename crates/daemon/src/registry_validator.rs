// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges the live [`Registries`] to [`ComponentValidator`] without
//! `devlog-config` depending on `devlog-runtime`/`devlog-adapters` (spec
//! §4.E "unknown (unregistered) entries log a warning but do not fail").

use std::sync::Arc;

use devlog_adapters::{Module, Plugin};
use devlog_config::{ComponentKind, ComponentValidator};
use devlog_runtime::Registries;
use serde_json::Value;

pub struct RegistryValidator {
    registries: Arc<Registries>,
}

impl RegistryValidator {
    pub fn new(registries: Arc<Registries>) -> Self {
        Self { registries }
    }
}

impl ComponentValidator for RegistryValidator {
    fn is_known(&self, kind: ComponentKind, name: &str) -> bool {
        match kind {
            ComponentKind::Module => self.registries.modules.contains(name),
            ComponentKind::Plugin => self.registries.plugins.contains(name),
        }
    }

    fn validate(&self, kind: ComponentKind, name: &str, extra: &Value) -> Result<(), String> {
        match kind {
            ComponentKind::Module => {
                let module: Arc<dyn Module> =
                    self.registries.modules.get(name).map_err(|e| e.to_string())?;
                module.validate_config(extra).map_err(|e| e.to_string())
            }
            ComponentKind::Plugin => {
                let plugin: Arc<dyn Plugin> =
                    self.registries.plugins.get(name).map_err(|e| e.to_string())?;
                plugin.validate_config(extra).map_err(|e| e.to_string())
            }
        }
    }
}
