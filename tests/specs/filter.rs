//! S6 (filter).

use crate::prelude::*;
use serde_json::json;

#[test]
#[serial_test::serial(devlog_filter)]
fn shell_ignore_list_filters_matching_commands() {
    let port = test_port(4);
    let daemon = Daemon::with_config(
        port,
        &format!("http:\n  port: {port}\nmodules:\n  shell:\n    enabled: true\n    ignore:\n      - ls\n"),
    );
    daemon.start();

    let response = daemon.post_json(
        "/api/v1/ingest",
        json!({
            "id": "shell-1",
            "source": "shell",
            "type": "command",
            "timestamp": "2025-01-01T00:00:00Z",
            "payload": {"command": "ls -l"},
        }),
    );
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["filtered"], json!(true));

    let events: Vec<serde_json::Value> = daemon.get("/api/v1/events?limit=10").json().unwrap();
    assert!(!events.iter().any(|e| e["id"] == json!("shell-1")));
}
