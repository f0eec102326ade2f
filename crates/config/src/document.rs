// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed configuration document (spec §3.5).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default loopback port, matching `spec.md` §3.5.
pub const DEFAULT_HTTP_PORT: u16 = 8573;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_HTTP_PORT
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// A single module/plugin entry: `enabled` plus a free-form sub-config
/// that round-trips through YAML without the core knowing its shape
/// (spec §9 "Free-form sub-configs").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComponentConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Value,
}

impl ComponentConfig {
    pub fn enabled(extra: Value) -> Self {
        Self {
            enabled: true,
            extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigDocument {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub modules: IndexMap<String, ComponentConfig>,
    #[serde(default)]
    pub plugins: IndexMap<String, ComponentConfig>,
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
