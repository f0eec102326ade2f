// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counts ingested events per source over its configured interval and
//! writes a trivial JSON digest, standing in for the real summariser's
//! domain logic (explicitly out of scope, spec §1) without pretending to
//! implement it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use devlog_storage::{QueryOptions, StorageEngine};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::contracts::{
    InstallContext, Plugin, PluginError, PluginMetadata, ServiceMap, ServiceProvider,
};

const DEFAULT_INTERVAL_SECS: u64 = 60;

pub struct SummarizerPlugin {
    storage: Arc<StorageEngine>,
    data_dir: PathBuf,
    latest_digest: Arc<Mutex<Option<Value>>>,
}

impl SummarizerPlugin {
    pub fn new(storage: Arc<StorageEngine>, data_dir: PathBuf) -> Self {
        Self {
            storage,
            data_dir,
            latest_digest: Arc::new(Mutex::new(None)),
        }
    }

    fn interval_from_config(config: &Value) -> Duration {
        let secs = config
            .get("interval_secs")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_INTERVAL_SECS)
            .max(1);
        Duration::from_secs(secs)
    }

    fn build_digest(&self, since: chrono::DateTime<Utc>) -> Result<Value, PluginError> {
        let options = QueryOptions {
            start_time: Some(since),
            limit: u32::MAX,
            ..Default::default()
        };
        let events = self
            .storage
            .query(&options)
            .map_err(|e| PluginError::Start(e.to_string()))?;

        let mut by_source: BTreeMap<String, u64> = BTreeMap::new();
        for event in &events {
            *by_source.entry(event.source.clone()).or_default() += 1;
        }

        Ok(json!({
            "generated_at": Utc::now().to_rfc3339(),
            "window_start": since.to_rfc3339(),
            "total_events": events.len(),
            "by_source": by_source,
        }))
    }

    fn write_digest(&self, digest: &Value) -> Result<(), PluginError> {
        let dir = self.data_dir.join("summaries");
        std::fs::create_dir_all(&dir).map_err(|e| PluginError::Start(e.to_string()))?;
        let path = dir.join("latest.json");
        let tmp = dir.join("latest.json.tmp");
        let bytes = serde_json::to_vec_pretty(digest).map_err(|e| PluginError::Start(e.to_string()))?;
        std::fs::write(&tmp, bytes).map_err(|e| PluginError::Start(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| PluginError::Start(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Plugin for SummarizerPlugin {
    fn name(&self) -> &str {
        "summarizer"
    }

    fn description(&self) -> &str {
        "periodic per-source event count digest"
    }

    async fn install(&self, _ctx: &InstallContext) -> Result<(), PluginError> {
        Ok(())
    }

    async fn uninstall(&self, _ctx: &InstallContext) -> Result<(), PluginError> {
        Ok(())
    }

    fn default_config(&self) -> Value {
        json!({ "interval_secs": DEFAULT_INTERVAL_SECS })
    }

    fn validate_config(&self, cfg: &Value) -> Result<(), PluginError> {
        if let Some(v) = cfg.get("interval_secs") {
            if !v.is_u64() || v.as_u64() == Some(0) {
                return Err(PluginError::Module(crate::contracts::ModuleError::Validation(
                    "interval_secs must be a positive integer".to_string(),
                )));
            }
        }
        Ok(())
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "summarizer".to_string(),
            description: self.description().to_string(),
            dependencies: Vec::new(),
        }
    }

    async fn start(&self, config: Value, cancel: CancellationToken) -> Result<(), PluginError> {
        let interval = Self::interval_from_config(&config);
        let mut window_start = Utc::now();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(interval) => {}
            }

            let digest = self.build_digest(window_start)?;
            *self.latest_digest.lock() = Some(digest.clone());
            if let Err(e) = self.write_digest(&digest) {
                tracing::warn!(error = %e, "summarizer failed to persist digest");
            }
            window_start = Utc::now();
        }
    }

    fn as_service_provider(&self) -> Option<&dyn ServiceProvider> {
        Some(self)
    }
}

impl ServiceProvider for SummarizerPlugin {
    fn services(&self) -> ServiceMap {
        let mut services = ServiceMap::new();
        services.insert(
            "summarizer.latest_digest".to_string(),
            self.latest_digest.clone() as Arc<dyn std::any::Any + Send + Sync>,
        );
        services
    }
}

#[cfg(test)]
#[path = "summarizer_tests.rs"]
mod tests;
