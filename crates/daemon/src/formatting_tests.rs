use std::sync::Arc;

use devlog_core::Event;

use super::*;

#[test]
fn registered_formatter_is_used() {
    let registry = FormatterRegistry::new();
    registry
        .register("git", Arc::new(|_: &Event| "custom".to_string()))
        .unwrap();

    let event = Event::new("git", "commit");
    assert_eq!(format_event_content(&registry, &event), "custom");
}

#[test]
fn unregistered_source_falls_back_to_source_slash_type() {
    let registry = FormatterRegistry::new();
    let event = Event::new("unknown", "thing");
    assert_eq!(format_event_content(&registry, &event), "unknown/thing");
}
