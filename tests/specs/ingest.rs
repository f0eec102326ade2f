//! S1 (ingest & observe) and S2 (duplicate).

use crate::prelude::*;
use serde_json::json;

fn commit_event() -> serde_json::Value {
    json!({
        "id": "a",
        "source": "git",
        "type": "commit",
        "timestamp": "2025-01-01T00:00:00Z",
        "payload": {"hash": "abc"},
    })
}

#[test]
#[serial_test::serial(devlog_ingest)]
fn ingest_then_status_and_query_see_the_event() {
    let daemon = Daemon::new(test_port(1));
    daemon.start();

    let response = daemon.post_json("/api/v1/ingest", commit_event());
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["success"], json!(true));

    let status: serde_json::Value = daemon.get("/api/v1/status").json().unwrap();
    assert!(status["event_count"].as_u64().unwrap() >= 1);

    let events: Vec<serde_json::Value> = daemon.get("/api/v1/events?limit=10").json().unwrap();
    assert!(events.iter().any(|e| e["id"] == json!("a")));
}

#[test]
#[serial_test::serial(devlog_ingest)]
fn duplicate_ingest_is_idempotent() {
    let daemon = Daemon::new(test_port(1));
    daemon.start();

    daemon.post_json("/api/v1/ingest", commit_event());
    let status_after_first: serde_json::Value = daemon.get("/api/v1/status").json().unwrap();
    let count_after_first = status_after_first["event_count"].as_u64().unwrap();

    let response = daemon.post_json("/api/v1/ingest", commit_event());
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["success"], json!(true));

    let status_after_second: serde_json::Value = daemon.get("/api/v1/status").json().unwrap();
    assert_eq!(status_after_second["event_count"].as_u64().unwrap(), count_after_first);
}
