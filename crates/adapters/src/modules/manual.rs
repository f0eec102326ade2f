// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The baseline collaborator: no poller, a pass-through ingest filter.
//! Used as the minimal fixture in integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use devlog_core::Event;
use serde_json::Value;

use crate::contracts::{IngestFilter, InstallContext, Module, ModuleError};

pub struct ManualModule;

impl ManualModule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ManualModule {
    fn default() -> Self {
        Self::new()
    }
}

struct PassThroughFilter;

impl IngestFilter for PassThroughFilter {
    fn should_capture(&self, _event: &Event, _config: &Value) -> bool {
        true
    }
}

#[async_trait]
impl Module for ManualModule {
    fn name(&self) -> &str {
        "manual"
    }

    fn description(&self) -> &str {
        "manually-submitted events with no collaborator-side processing"
    }

    async fn install(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), ModuleError> {
        Ok(())
    }

    fn ingest_filter(&self) -> Option<Arc<dyn IngestFilter>> {
        Some(Arc::new(PassThroughFilter))
    }
}

#[cfg(test)]
#[path = "manual_tests.rs"]
mod tests;
