// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon orchestrator: strict startup sequencing, graceful shutdown
//! (spec §4.K).

use std::fs::File;
use std::io::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use devlog_config::{ConfigDiff, ConfigDocument, ConfigSubstrate, ConfigWatcher};
use devlog_runtime::{apply_diff, DiffContext, Metrics, PluginRuntime, Registries};
use devlog_storage::{OfflineQueue, StateStore, StorageEngine};
use fs2::FileExt;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::components::register_components;
use crate::events::EventService;
use crate::paths::Paths;
use crate::registry_validator::RegistryValidator;

/// Grace period for the HTTP listener's own shutdown (spec §5).
pub const HTTP_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine config/data directory")]
    NoStateDir,
    #[error("devlogd is already running (pid {0})")]
    AlreadyRunning(i32),
    #[error("failed to acquire pid lock: {0}")]
    LockFailed(#[source] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] devlog_config::ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] devlog_storage::StorageError),
    #[error("state store error: {0}")]
    StateStore(#[from] devlog_storage::StateStoreError),
    #[error("queue error: {0}")]
    Queue(#[from] devlog_storage::QueueError),
    #[error("watcher error: {0}")]
    Watcher(#[from] devlog_config::WatcherError),
    #[error("diff driver error: {0}")]
    DiffDriver(#[from] devlog_runtime::DiffDriverError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the running daemon holds for its lifetime. Dropping this
/// releases the PID lock.
pub struct Lifecycle {
    pub paths: Paths,
    pub config: Arc<ConfigSubstrate>,
    pub registries: Arc<Registries>,
    pub storage: Arc<StorageEngine>,
    pub state: Arc<StateStore>,
    pub plugin_runtime: Arc<PluginRuntime>,
    pub metrics: Arc<Metrics>,
    pub event_service: Arc<EventService>,
    pub diff_ctx: Arc<DiffContext>,
    pub start_time: Instant,
    pub root_cancel: CancellationToken,
    pid_lock: Option<File>,
    watcher: Option<ConfigWatcher>,
}

impl Lifecycle {
    /// Run the strict startup sequence from spec §4.K, adapted in one
    /// respect: component registration (which the summarizer plugin needs
    /// a live storage handle for) happens right after storage opens,
    /// ahead of config parsing, rather than before the orchestrator runs
    /// at all. Config validation against an empty or partial registry set
    /// is never fatal (spec §4.E: unregistered entries only warn), so this
    /// reordering changes no observable startup behaviour; see DESIGN.md.
    pub async fn start(paths: Paths) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(&paths.config_dir)?;
        std::fs::create_dir_all(&paths.data_dir)?;

        let storage = Arc::new(StorageEngine::open(&paths.db_path)?);

        let registries = Arc::new(Registries::new());
        register_components(&registries, storage.clone(), &paths.data_dir);

        let validator = Arc::new(RegistryValidator::new(registries.clone()));
        let config = Arc::new(ConfigSubstrate::load(&paths.config_path, validator.as_ref())?);

        let pid_lock = Self::acquire_pid_lock(&paths)?;

        let queue = OfflineQueue::new(&paths.queue_dir)?;
        Self::drain_queue(&queue, &storage);

        let state = Arc::new(StateStore::open(&paths.state_path)?);
        let metrics = Arc::new(Metrics::new());
        let root_cancel = CancellationToken::new();

        let scheduler = Arc::new(devlog_runtime::PollerScheduler::new(storage.clone()));
        let plugin_runtime = Arc::new(
            PluginRuntime::new(registries.plugins.clone(), root_cancel.child_token())
                .with_metrics(metrics.clone()),
        );

        let diff_ctx = Arc::new(DiffContext::new(
            registries.clone(),
            scheduler,
            plugin_runtime.clone(),
            state.clone(),
            paths.data_dir.clone(),
            root_cancel.child_token(),
        ));

        // Starting pollers/plugins from an empty "bootstrap" document is
        // exactly a config reload from nothing, so the ordinary diff path
        // covers startup too (spec §4.K steps 6-7).
        let bootstrap = ConfigDocument::default();
        let document = config.document();
        let diff = ConfigDiff::compute(&bootstrap, &document);
        apply_diff(&diff_ctx, &bootstrap, &document, &diff).await?;

        let (watcher, settled_rx) =
            ConfigWatcher::spawn(&paths.config_path, root_cancel.child_token())?;
        spawn_reload_bridge(config.clone(), diff_ctx.clone(), validator, settled_rx);

        let event_service = Arc::new(EventService::new(
            storage.clone(),
            registries.formatters.clone(),
        ));

        tracing::info!(port = config.document().http.port, "devlogd ready");

        Ok(Self {
            paths,
            config,
            registries,
            storage,
            state,
            plugin_runtime,
            metrics,
            event_service,
            diff_ctx,
            start_time: Instant::now(),
            root_cancel,
            pid_lock: Some(pid_lock),
            watcher: Some(watcher),
        })
    }

    /// Build the state the HTTP surface (`crate::http`) runs against.
    pub fn app_state(&self) -> crate::http::AppState {
        crate::http::AppState {
            storage: self.storage.clone(),
            registries: self.registries.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            events: self.event_service.clone(),
            start_time: self.start_time,
            queue_dir: self.paths.queue_dir.clone(),
        }
    }

    fn acquire_pid_lock(paths: &Paths) -> Result<File, LifecycleError> {
        let lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&paths.pid_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            let existing = std::fs::read_to_string(&paths.pid_path).unwrap_or_default();
            let pid: i32 = existing.trim().parse().unwrap_or(0);
            if pid > 0 && kill(Pid::from_raw(pid), None).is_ok() {
                return Err(LifecycleError::AlreadyRunning(pid));
            }
            // The previous owner is dead; steal the stale lock.
            lock_file
                .try_lock_exclusive()
                .map_err(LifecycleError::LockFailed)?;
        }

        let mut lock_file = lock_file;
        lock_file.set_len(0)?;
        writeln!(lock_file, "{}", std::process::id())?;
        Ok(lock_file)
    }

    fn drain_queue(queue: &OfflineQueue, storage: &StorageEngine) {
        let events = match queue.list() {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list offline queue at startup");
                return;
            }
        };
        for event in events {
            match storage.insert(&event) {
                Ok(()) | Err(devlog_storage::StorageError::DuplicateId(_)) => {
                    if let Err(e) = queue.remove(&event.id) {
                        tracing::warn!(id = %event.id, error = %e, "failed to remove drained queue entry");
                    }
                }
                Err(e) => {
                    tracing::warn!(id = %event.id, error = %e, "failed to drain queued event, leaving queued");
                }
            }
        }
    }

    /// Gracefully tear the daemon down: reverse of startup, with bounded
    /// waits (spec §4.K / §5). The caller is responsible for shutting the
    /// HTTP listener down (with its own 10 s grace) before calling this,
    /// since the listener is owned by `main`, not by `Lifecycle`.
    pub async fn shutdown(&mut self) {
        tracing::info!("shutting down");
        self.root_cancel.cancel();
        drop(self.watcher.take());

        if let Err(e) = std::fs::remove_file(&self.paths.pid_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, "failed to remove pid file");
            }
        }
        drop(self.pid_lock.take());
        tracing::info!("shutdown complete");
    }
}

/// Bridge the watcher's synchronous "settled" channel into an async reload
/// loop: each settle event reloads, revalidates, and — only if valid —
/// diffs and applies the new document (spec §4.E).
fn spawn_reload_bridge(
    config: Arc<ConfigSubstrate>,
    diff_ctx: Arc<DiffContext>,
    validator: Arc<RegistryValidator>,
    settled_rx: std::sync::mpsc::Receiver<()>,
) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    std::thread::spawn(move || {
        while settled_rx.recv().is_ok() {
            if tx.send(()).is_err() {
                return;
            }
        }
    });

    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            let old = config.document();
            match config.reload_candidate(validator.as_ref()) {
                Ok(new) => {
                    let diff = ConfigDiff::compute(&old, &new);
                    config.set_document(new.clone());
                    if let Err(e) = apply_diff(&diff_ctx, &old, &new, &diff).await {
                        tracing::error!(error = %e, "failed to apply config diff");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "invalid config reload, keeping previous document");
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
