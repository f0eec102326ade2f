// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event service (spec §4.N): a thin layer over the storage engine that
//! normalises sort/format options for external callers and materialises
//! textual output via the formatting registry (§4.M) on request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use devlog_core::Event;
use devlog_runtime::FormatterRegistry;
use devlog_storage::{QueryOptions, SearchOptions, SortOrder, StorageEngine, StorageError};

use crate::formatting::format_event_content;

/// An event paired with its formatted text, for callers that want both
/// (spec §4.N "materialises textual output ... when asked").
#[derive(Debug, Clone)]
pub struct FormattedEvent {
    pub event: Event,
    pub text: String,
}

pub struct EventService {
    storage: Arc<StorageEngine>,
    formatters: Arc<FormatterRegistry>,
}

impl EventService {
    pub fn new(storage: Arc<StorageEngine>, formatters: Arc<FormatterRegistry>) -> Self {
        Self {
            storage,
            formatters,
        }
    }

    /// `status`/tail-style listing: most recent events, optionally
    /// restricted to one source.
    pub fn recent(&self, limit: u32, source: Option<&str>) -> Result<Vec<Event>, StorageError> {
        let options = QueryOptions {
            source: source.map(str::to_string),
            limit,
            sort_order: SortOrder::TimeDesc,
            ..Default::default()
        };
        self.storage.query(&options)
    }

    /// Full-text search, optionally bounded to events since `since`.
    pub fn search(
        &self,
        query: &str,
        since: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Event>, StorageError> {
        let options = SearchOptions {
            base: QueryOptions {
                start_time: since,
                limit,
                sort_order: SortOrder::Relevance,
                ..Default::default()
            },
            query_string: query.to_string(),
        };
        self.storage.search(&options)
    }

    pub fn format(&self, event: &Event) -> String {
        format_event_content(&self.formatters, event)
    }

    pub fn with_formatted_text(&self, events: Vec<Event>) -> Vec<FormattedEvent> {
        events
            .into_iter()
            .map(|event| {
                let text = self.format(&event);
                FormattedEvent { event, text }
            })
            .collect()
    }

    pub fn count(&self) -> Result<u64, StorageError> {
        self.storage.count()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
