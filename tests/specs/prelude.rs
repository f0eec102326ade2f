//! Test helpers for devlog's end-to-end behavioral specifications.
//!
//! Black-box: spawn `devlogd`, talk to it over loopback HTTP and through
//! the `devlog` CLI, and assert on what comes back.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Returns the path to a binary, falling back to resolving relative to
/// the test binary itself when `CARGO_MANIFEST_DIR` is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

fn devlog_binary() -> PathBuf {
    binary_path("devlog")
}

pub fn devlogd_binary() -> PathBuf {
    binary_path("devlogd")
}

pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// Fluent builder for `devlog` CLI invocations in tests.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![(
                "DEVLOG_DAEMON_BINARY".into(),
                devlogd_binary().to_string_lossy().into(),
            )],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string_lossy().to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(devlog_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }
}

/// Poll a condition until it returns true or the timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// A temporary, isolated `devlogd` instance: its own `DEVLOG_STATE_DIR`
/// (doubling as both config and data dir) and a loopback HTTP client
/// pointed at whatever port its config document says to use.
pub struct Daemon {
    state_dir: tempfile::TempDir,
    port: u16,
    http: reqwest::blocking::Client,
}

impl Daemon {
    /// Prepare (but do not start) an isolated daemon, writing `config_yaml`
    /// as its config document ahead of time.
    pub fn with_config(port: u16, config_yaml: &str) -> Self {
        let state_dir = tempfile::tempdir().unwrap();
        std::fs::write(state_dir.path().join("config.yaml"), config_yaml).unwrap();
        Self {
            state_dir,
            port,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn new(port: u16) -> Self {
        Self::with_config(port, &format!("http:\n  port: {port}\n"))
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn devlog(&self) -> CliBuilder {
        cli().env("DEVLOG_STATE_DIR", self.state_path())
    }

    pub fn start(&self) {
        self.devlog().args(&["daemon", "start"]).passes();
    }

    pub fn stop(&self) {
        let _ = self.devlog().args(&["daemon", "stop"]).command().output();
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub fn post_json(&self, path: &str, body: serde_json::Value) -> reqwest::blocking::Response {
        self.http.post(self.url(path)).json(&body).send().expect("request should send")
    }

    pub fn get(&self, path: &str) -> reqwest::blocking::Response {
        self.http.get(self.url(path)).send().expect("request should send")
    }

    pub fn queue_dir(&self) -> PathBuf {
        self.state_path().join("queue")
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A loopback port offset from the default so each spec module gets its
/// own, even though every daemon-spawning test within a module still
/// serializes via `#[serial_test::serial]`.
pub fn test_port(offset: u16) -> u16 {
    devlog_config::DEFAULT_HTTP_PORT + offset
}
