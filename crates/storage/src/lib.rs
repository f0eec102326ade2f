// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! devlog-storage: the embedded event store, offline queue, and state store.

mod engine;
mod migrations;
mod queue;
mod state_store;

pub use engine::{QueryOptions, SearchOptions, SortOrder, StorageEngine, StorageError};
pub use queue::{OfflineQueue, QueueError};
pub use state_store::{StateStore, StateStoreError};
