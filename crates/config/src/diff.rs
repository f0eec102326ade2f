// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Symmetric-difference computation between two config documents
//! (spec §4.I).

use indexmap::IndexMap;

use crate::document::{ComponentConfig, ConfigDocument};

/// Which sub-table a component lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Module,
    Plugin,
}

impl ComponentKind {
    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::Module => "module",
            ComponentKind::Plugin => "plugin",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentChange {
    Start,
    Stop,
    Restart,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDiff {
    pub changes: Vec<(ComponentKind, String, ComponentChange)>,
}

impl ConfigDiff {
    /// Compute what changed between `old` and `new` for both `modules`
    /// and `plugins`, by name:
    ///
    /// - Added and enabled -> `Start`
    /// - Removed (or disabled) and was previously enabled -> `Stop`
    /// - Present and enabled in both, but the sub-config differs by
    ///   canonical JSON equality -> `Restart`
    pub fn compute(old: &ConfigDocument, new: &ConfigDocument) -> Self {
        let mut changes = Vec::new();
        changes.extend(diff_table(ComponentKind::Module, &old.modules, &new.modules));
        changes.extend(diff_table(ComponentKind::Plugin, &old.plugins, &new.plugins));
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn diff_table(
    kind: ComponentKind,
    old: &IndexMap<String, ComponentConfig>,
    new: &IndexMap<String, ComponentConfig>,
) -> Vec<(ComponentKind, String, ComponentChange)> {
    let mut out = Vec::new();

    for (name, new_cfg) in new {
        match old.get(name) {
            None => {
                if new_cfg.enabled {
                    out.push((kind, name.clone(), ComponentChange::Start));
                }
            }
            Some(old_cfg) => {
                if old_cfg.enabled && !new_cfg.enabled {
                    out.push((kind, name.clone(), ComponentChange::Stop));
                } else if !old_cfg.enabled && new_cfg.enabled {
                    out.push((kind, name.clone(), ComponentChange::Start));
                } else if old_cfg.enabled && new_cfg.enabled && old_cfg.extra != new_cfg.extra {
                    out.push((kind, name.clone(), ComponentChange::Restart));
                }
            }
        }
    }

    for (name, old_cfg) in old {
        if !new.contains_key(name) && old_cfg.enabled {
            out.push((kind, name.clone(), ComponentChange::Stop));
        }
    }

    out
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
