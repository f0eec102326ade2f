// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! devlog-runtime: registries, poller scheduler, plugin runtime, the
//! config-diff driver, and the metrics snapshot (spec §4.F-§4.I, §4.L).

pub mod diff_driver;
pub mod metrics;
pub mod plugin_runtime;
pub mod registries;
pub mod scheduler;

pub use diff_driver::{apply_diff, DiffContext, DiffDriverError};
pub use metrics::{Metrics, MetricsSnapshot, MetricsSummary, PluginSummary};
pub use plugin_runtime::{PluginInstance, PluginRuntime, PluginRuntimeError};
pub use registries::{
    Formatter, FormatterRegistry, IngestHandlerRegistry, ModuleRegistry, NamedRegistry,
    PluginRegistry, RegistryError, Registries,
};
pub use scheduler::{PollerHandle, PollerScheduler};
