//! S3 (offline queue drain).

use std::io::Write;

use crate::prelude::*;
use serde_json::json;

#[test]
#[serial_test::serial(devlog_offline_queue)]
fn queued_events_drain_on_startup() {
    let daemon = Daemon::new(test_port(2));

    // Daemon is not running yet: `devlog ingest` must fall back to the
    // offline queue rather than fail.
    for (id, command) in [("q1", "echo one"), ("q2", "echo two")] {
        let event = json!({
            "id": id,
            "source": "shell",
            "type": "command",
            "timestamp": "2025-01-01T00:00:00Z",
            "payload": {"command": command},
        });
        let mut child = daemon
            .devlog()
            .args(&["ingest"])
            .command()
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .spawn()
            .unwrap();
        child.stdin.take().unwrap().write_all(event.to_string().as_bytes()).unwrap();
        let output = child.wait_with_output().unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("queued"));
    }

    let queue_dir = daemon.queue_dir();
    let queued_files = std::fs::read_dir(&queue_dir).unwrap().count();
    assert_eq!(queued_files, 2, "both events should have landed in the offline queue");

    daemon.start();

    let drained = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_dir(&queue_dir).map(|mut d| d.next().is_none()).unwrap_or(false)
    });
    assert!(drained, "offline queue should be empty once the daemon has drained it");

    let events: Vec<serde_json::Value> = daemon.get("/api/v1/events?limit=10").json().unwrap();
    assert!(events.iter().any(|e| e["id"] == json!("q1")));
    assert!(events.iter().any(|e| e["id"] == json!("q2")));
}
