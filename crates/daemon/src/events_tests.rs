use std::sync::Arc;

use devlog_core::Event;
use devlog_runtime::FormatterRegistry;
use devlog_storage::StorageEngine;

use super::*;

fn service_with(events: &[Event]) -> EventService {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    for event in events {
        storage.insert(event).unwrap();
    }
    EventService::new(storage, Arc::new(FormatterRegistry::new()))
}

#[test]
fn recent_filters_by_source() {
    let service = service_with(&[Event::new("git", "commit"), Event::new("shell", "command")]);
    let events = service.recent(10, Some("git")).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, "git");
}

#[test]
fn search_falls_back_to_source_slash_type_with_no_formatter() {
    let service = service_with(&[]);
    let event = Event::new("git", "commit");
    assert_eq!(service.format(&event), "git/commit");
}

#[test]
fn with_formatted_text_pairs_every_event_with_its_text() {
    let service = service_with(&[Event::new("git", "commit")]);
    let events = service.recent(10, None).unwrap();
    let formatted = service.with_formatted_text(events);
    assert_eq!(formatted.len(), 1);
    assert_eq!(formatted[0].text, "git/commit");
}
