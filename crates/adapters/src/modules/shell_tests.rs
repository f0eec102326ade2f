// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;
use yare::parameterized;

use super::*;

fn shell_event(command: &str) -> Event {
    let mut event = Event::new("shell", "command");
    event.payload.insert("command".to_string(), json!(command));
    event
}

#[parameterized(
    exact_match = { "ls", true },
    with_surrounding_whitespace = { "  ls  ", true },
    with_arguments = { "ls -l", true },
    different_command_not_ignored = { "rm -rf /", false },
)]
fn ignore_list_filters_by_program_name(command: &str, should_be_filtered: bool) {
    let filter = IgnoreListFilter;
    let config = json!({ "ignore": ["ls"] });
    let captured = filter.should_capture(&shell_event(command), &config);
    assert_eq!(!captured, should_be_filtered);
}

#[test]
fn non_shell_events_are_always_captured() {
    let filter = IgnoreListFilter;
    let event = Event::new("git", "commit");
    assert!(filter.should_capture(&event, &json!({"ignore": ["ls"]})));
}

#[test]
fn missing_command_field_is_captured() {
    let filter = IgnoreListFilter;
    let event = Event::new("shell", "command");
    assert!(filter.should_capture(&event, &json!({"ignore": ["ls"]})));
}
