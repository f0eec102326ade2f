use devlog_core::Event;
use devlog_storage::StorageEngine;
use tempfile::tempdir;

use super::*;

#[test]
fn register_components_populates_every_table() {
    let registries = Registries::new();
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let dir = tempdir().unwrap();

    register_components(&registries, storage, dir.path());

    assert!(registries.modules.contains("git"));
    assert!(registries.modules.contains("shell"));
    assert!(registries.modules.contains("tmux"));
    assert!(registries.modules.contains("clipboard"));
    assert!(registries.modules.contains("manual"));
    assert!(registries.plugins.contains("summarizer"));
    assert!(registries.ingest_handlers.contains("shell"));
    assert!(registries.ingest_handlers.contains("manual"));
    assert!(registries.formatters.contains("git"));
}

#[test]
fn git_formatter_prefers_the_payload_message() {
    let registries = Registries::new();
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let dir = tempdir().unwrap();
    register_components(&registries, storage, dir.path());

    let mut event = Event::new("git", "commit");
    event.repo = Some("/p".to_string());
    event.branch = Some("main".to_string());
    event
        .payload
        .insert("message".to_string(), "fix bug".into());

    let formatter = registries.formatters.get("git").unwrap();
    assert_eq!(formatter(&event), "[/p@main] fix bug");
}
