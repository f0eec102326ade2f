// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supplies the ignore-list filter named in spec §6.4: "the shell module
//! ... supplies a filter that inspects `payload.command` against an
//! ignore-list".

use std::sync::Arc;

use async_trait::async_trait;
use devlog_core::Event;
use serde_json::Value;

use crate::contracts::{IngestFilter, InstallContext, Module, ModuleError};

pub struct ShellModule;

impl ShellModule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellModule {
    fn default() -> Self {
        Self::new()
    }
}

struct IgnoreListFilter;

impl IngestFilter for IgnoreListFilter {
    fn should_capture(&self, event: &Event, config: &Value) -> bool {
        if event.source != "shell" {
            return true;
        }
        let Some(command) = event.payload.get("command").and_then(Value::as_str) else {
            return true;
        };
        let ignore = config
            .get("ignore")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect::<Vec<_>>())
            .unwrap_or_default();
        let program = command.trim().split_whitespace().next().unwrap_or("");
        !ignore.iter().any(|pattern| *pattern == program)
    }
}

#[async_trait]
impl Module for ShellModule {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "shell command capture with an ignore-list filter"
    }

    async fn install(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    fn default_config(&self) -> Value {
        serde_json::json!({ "ignore": [] })
    }

    fn ingest_filter(&self) -> Option<Arc<dyn IngestFilter>> {
        Some(Arc::new(IgnoreListFilter))
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
