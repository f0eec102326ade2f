// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

use super::*;

#[test]
fn settles_once_after_a_burst_of_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "http:\n  port: 8573\n").unwrap();

    let cancel = CancellationToken::new();
    let (_watcher, rx) = ConfigWatcher::spawn(&path, cancel.clone()).unwrap();

    for i in 0..5 {
        std::fs::write(&path, format!("http:\n  port: {}\n", 8573 + i)).unwrap();
        std::thread::sleep(Duration::from_millis(20));
    }

    let got = rx.recv_timeout(Duration::from_secs(2));
    assert!(got.is_ok(), "expected a settled notification after the burst");

    cancel.cancel();
}

#[test]
fn unrelated_file_in_same_directory_does_not_trigger() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "http:\n  port: 8573\n").unwrap();
    let other = dir.path().join("scratch.txt");

    let cancel = CancellationToken::new();
    let (_watcher, rx) = ConfigWatcher::spawn(&path, cancel.clone()).unwrap();

    std::fs::write(&other, "noise").unwrap();
    let got = rx.recv_timeout(Duration::from_millis(800));
    assert!(got.is_err(), "unrelated file write should not settle the watcher");

    cancel.cancel();
}
