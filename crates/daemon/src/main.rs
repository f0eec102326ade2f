// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! devlogd — the personal developer-telemetry daemon.
//!
//! Owns the event store, the config-driven module/plugin runtime, and a
//! loopback-only HTTP ingest surface. Normally started by the `devlog`
//! CLI and left running in the background.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use devlog_daemon::lifecycle::HTTP_SHUTDOWN_GRACE;
use devlog_daemon::{Lifecycle, LifecycleError, Paths};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("devlogd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("devlogd {}", env!("CARGO_PKG_VERSION"));
                println!("DevLog daemon — background process that owns the event store");
                println!();
                println!("USAGE:");
                println!("    devlogd");
                println!();
                println!("devlogd is typically started by the `devlog` CLI and should not");
                println!("be invoked directly. It serves a loopback-only HTTP ingest API.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: devlogd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let paths = Paths::discover()?;
    rotate_log_if_needed(&paths.log_path);
    write_startup_marker(&paths)?;
    let log_guard = setup_logging(&paths)?;

    info!("starting devlogd");

    let mut lifecycle = match Lifecycle::start(paths.clone()).await {
        Ok(lifecycle) => lifecycle,
        Err(LifecycleError::AlreadyRunning(pid)) => {
            eprintln!("devlogd is already running");
            eprintln!("  pid: {pid}");
            drop(log_guard);
            std::process::exit(1);
        }
        Err(e) => {
            write_startup_error(&paths, &e);
            error!(error = %e, "failed to start devlogd");
            drop(log_guard);
            return Err(e.into());
        }
    };

    let port = lifecycle.config.document().http.port;
    let http_cancel = CancellationToken::new();
    let http_handle = tokio::spawn(devlog_daemon::serve(
        lifecycle.app_state(),
        port,
        http_cancel.child_token(),
    ));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(port, "devlogd ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    http_cancel.cancel();
    match tokio::time::timeout(HTTP_SHUTDOWN_GRACE, http_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => error!(error = %e, "http surface exited with an error"),
        Ok(Err(e)) => error!(error = %e, "http surface task panicked"),
        Err(_) => error!("http surface did not shut down within its grace period"),
    }

    lifecycle.shutdown().await;
    info!("devlogd stopped");
    Ok(())
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (devlogd.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Best-effort:
/// rotation failures are silently ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

const STARTUP_MARKER_PREFIX: &str = "--- devlogd: starting (pid: ";

fn write_startup_marker(paths: &Paths) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = paths.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)?;
    writeln!(file, "{}{}) ---\n", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

fn write_startup_error(paths: &Paths, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start devlogd: {error}");
}

fn setup_logging(
    paths: &Paths,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = paths.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        paths.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        paths.log_path.file_name().ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
