// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-initialisation registration (spec §4.F: "Registrations happen
//! at process initialisation time, before the orchestrator runs"). The
//! summarizer plugin needs a live storage handle, so this runs right
//! after storage opens rather than before it — see DESIGN.md OQ notes.

use std::path::Path;
use std::sync::Arc;

use devlog_adapters::modules::{ClipboardModule, GitModule, ManualModule, ShellModule, TmuxModule};
use devlog_adapters::plugins::SummarizerPlugin;
use devlog_runtime::Registries;
use devlog_storage::StorageEngine;

/// Register every representative module/plugin this workspace ships, plus
/// their formatters. Fails only if a name collides, which would indicate
/// a bug in this function, not runtime input.
pub fn register_components(
    registries: &Registries,
    storage: Arc<StorageEngine>,
    data_dir: &Path,
) {
    let manual = Arc::new(ManualModule::new());
    let shell = Arc::new(ShellModule::new());
    let git = Arc::new(GitModule::new());
    let tmux = Arc::new(TmuxModule::new());
    let clipboard = Arc::new(ClipboardModule::new());

    if let Some(filter) = manual.ingest_filter() {
        let _ = registries.ingest_handlers.register("manual", filter);
    }
    if let Some(filter) = shell.ingest_filter() {
        let _ = registries.ingest_handlers.register("shell", filter);
    }

    let _ = registries.modules.register("manual", manual);
    let _ = registries.modules.register("shell", shell);
    let _ = registries.modules.register("git", git);
    let _ = registries.modules.register("tmux", tmux);
    let _ = registries.modules.register("clipboard", clipboard);

    let summarizer = Arc::new(SummarizerPlugin::new(storage, data_dir.to_path_buf()));
    let _ = registries.plugins.register("summarizer", summarizer);

    register_formatters(registries);
}

fn register_formatters(registries: &Registries) {
    let _ = registries.formatters.register(
        "git",
        Arc::new(|event: &devlog_core::Event| {
            let message = event
                .payload
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or(event.event_type.as_str());
            match (&event.repo, &event.branch) {
                (Some(repo), Some(branch)) => format!("[{repo}@{branch}] {message}"),
                (Some(repo), None) => format!("[{repo}] {message}"),
                _ => message.to_string(),
            }
        }),
    );

    let _ = registries.formatters.register(
        "shell",
        Arc::new(|event: &devlog_core::Event| {
            event
                .payload
                .get("command")
                .and_then(|v| v.as_str())
                .map(|cmd| format!("$ {cmd}"))
                .unwrap_or_else(|| "shell/command".to_string())
        }),
    );

    let _ = registries.formatters.register(
        "tmux",
        Arc::new(|event: &devlog_core::Event| {
            event
                .payload
                .get("pane")
                .and_then(|v| v.as_str())
                .map(|pane| format!("tmux pane {pane}: {}", event.event_type))
                .unwrap_or_else(|| format!("tmux/{}", event.event_type))
        }),
    );

    let _ = registries.formatters.register(
        "clipboard",
        Arc::new(|_event: &devlog_core::Event| "clipboard content changed".to_string()),
    );

    let _ = registries.formatters.register(
        "manual",
        Arc::new(|event: &devlog_core::Event| {
            event
                .payload
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| event.event_type.clone())
        }),
    );
}

#[cfg(test)]
#[path = "components_tests.rs"]
mod tests;
