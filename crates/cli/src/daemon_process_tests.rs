// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn read_pid_returns_none_without_a_lock_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths {
        config_path: dir.path().join("config.yaml"),
        pid_path: dir.path().join("devlogd.pid"),
        log_path: dir.path().join("devlogd.log"),
        queue_dir: dir.path().join("queue"),
    };

    assert_eq!(read_pid(&paths), None);
}

#[test]
fn read_pid_parses_the_stored_value() {
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("devlogd.pid");
    std::fs::write(&pid_path, "4242\n").unwrap();
    let paths = Paths {
        config_path: dir.path().join("config.yaml"),
        pid_path,
        log_path: dir.path().join("devlogd.log"),
        queue_dir: dir.path().join("queue"),
    };

    assert_eq!(read_pid(&paths), Some(4242));
}

#[test]
fn process_exists_is_true_for_the_current_process() {
    assert!(process_exists(std::process::id() as i32));
}

#[test]
fn process_exists_is_false_for_an_unlikely_pid() {
    assert!(!process_exists(i32::MAX - 1));
}
