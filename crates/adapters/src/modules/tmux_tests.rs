// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn new_panes_emit_pane_open() {
    let current = set(&["%0", "%1"]);
    let previous = set(&["%0"]);
    let events = diff_panes(&current, &previous);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "pane_open");
    assert_eq!(events[0].payload["pane_id"], json!("%1"));
}

#[test]
fn disappeared_panes_emit_pane_close() {
    let current = set(&["%0"]);
    let previous = set(&["%0", "%1"]);
    let events = diff_panes(&current, &previous);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "pane_close");
    assert_eq!(events[0].payload["pane_id"], json!("%1"));
}

#[test]
fn unchanged_pane_set_emits_nothing() {
    let panes = set(&["%0", "%1"]);
    assert!(diff_panes(&panes, &panes).is_empty());
}

#[tokio::test]
async fn poll_persists_the_pane_set_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(StateStore::open(dir.path().join("poller_state.json")).unwrap());
    state
        .set(COMPONENT, "panes", json!(["%0"]))
        .unwrap();
    assert_eq!(
        state.get(COMPONENT, "panes").unwrap(),
        json!(["%0"])
    );
}
