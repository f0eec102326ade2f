// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event id generation.

use uuid::Uuid;

/// Generate a fresh globally-unique event id.
///
/// Callers that already have a stable id (e.g. re-ingesting from the
/// offline queue) should use that instead; this is only for brand-new
/// events created by a module or poller.
pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
