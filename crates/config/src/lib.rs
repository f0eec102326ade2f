// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! devlog-config: the typed, hot-reloadable configuration substrate
//! (spec §3.5 / §4.E / §4.I).

mod diff;
mod document;
mod substrate;
mod watcher;

pub use diff::{ComponentChange, ComponentKind, ConfigDiff};
pub use document::{ComponentConfig, ConfigDocument, HttpConfig, DEFAULT_HTTP_PORT};
pub use substrate::{ComponentValidator, ConfigError, ConfigSubstrate, PermissiveValidator};
pub use watcher::{ConfigWatcher, WatcherError};
