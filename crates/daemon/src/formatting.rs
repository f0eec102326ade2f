// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Formatting registry consumer (spec §4.M). Formatters are pure and
//! I/O-free; a miss falls back to `"<source>/<type>"`.

use devlog_core::Event;
use devlog_runtime::FormatterRegistry;

pub fn format_event_content(formatters: &FormatterRegistry, event: &Event) -> String {
    match formatters.get(&event.source) {
        Ok(formatter) => formatter(event),
        Err(_) => format!("{}/{}", event.source, event.event_type),
    }
}

#[cfg(test)]
#[path = "formatting_tests.rs"]
mod tests;
