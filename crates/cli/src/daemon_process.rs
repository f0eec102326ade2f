// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting, stopping, and probing the `devlogd` background process.

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::paths::Paths;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Spawn `devlogd` detached, in the background.
pub fn start_background() -> anyhow::Result<std::process::Child> {
    let devlogd_path = find_devlogd_binary();
    Command::new(devlogd_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to start devlogd: {e}"))
}

/// Read the PID devlogd wrote to its lock file, if any.
pub fn read_pid(paths: &Paths) -> Option<i32> {
    std::fs::read_to_string(&paths.pid_path)
        .ok()
        .and_then(|content| content.trim().parse().ok())
}

/// Whether a process with this PID currently exists.
pub fn process_exists(pid: i32) -> bool {
    signal::kill(Pid::from_raw(pid), None).is_ok()
}

/// Send SIGTERM, then poll for exit, escalating to SIGKILL past the
/// timeout. Returns `true` if a daemon was found and stopped.
pub fn stop(paths: &Paths) -> anyhow::Result<bool> {
    let Some(pid) = read_pid(paths) else {
        return Ok(false);
    };
    if !process_exists(pid) {
        return Ok(false);
    }

    signal::kill(Pid::from_raw(pid), Signal::SIGTERM)
        .map_err(|e| anyhow::anyhow!("failed to signal devlogd (pid {pid}): {e}"))?;

    let start = Instant::now();
    while start.elapsed() < STOP_TIMEOUT {
        if !process_exists(pid) {
            return Ok(true);
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let _ = signal::kill(Pid::from_raw(pid), Signal::SIGKILL);
    Ok(true)
}

fn find_devlogd_binary() -> PathBuf {
    if let Ok(exe) = std::env::var("DEVLOG_DAEMON_BINARY") {
        return PathBuf::from(exe);
    }

    if let Ok(current_exe) = std::env::current_exe() {
        if let Some(dir) = current_exe.parent() {
            let sibling = dir.join("devlogd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("devlogd")
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
