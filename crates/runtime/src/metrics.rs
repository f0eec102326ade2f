// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory metrics snapshot served at `/api/v1/metrics` (spec §3.6 /
//! §4.L). Bounded cardinality: per-source/per-type tallies evict the
//! oldest key once [`MAX_TRACKED_KEYS`] is exceeded, so an adversarial or
//! buggy module can't grow this structure without bound.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Timelike, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

const MAX_TRACKED_KEYS: usize = 256;
const BUCKET_TTL_HOURLY: Duration = Duration::from_secs(48 * 3600);
const BUCKET_TTL_DAILY: Duration = Duration::from_secs(30 * 24 * 3600);
/// A plugin error within this window still counts as "running (with
/// errors)" rather than a clean "running" (spec §4.L).
const RECENT_ERROR_WINDOW: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Default)]
struct PluginStats {
    start_time: Option<DateTime<Utc>>,
    error_count: u64,
    last_error: Option<(DateTime<Utc>, String)>,
    restarts: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginSummary {
    pub start_time: Option<DateTime<Utc>>,
    pub error_count: u64,
    pub last_error: Option<String>,
    pub restarts: u64,
    pub status: &'static str,
}

#[derive(Debug, Clone, Default)]
struct SystemMetrics {
    queue_depth: u64,
    db_size: u64,
    event_count: u64,
    uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub events_ingested: u64,
    pub events_by_source: HashMap<String, u64>,
    pub events_by_type: HashMap<String, u64>,
    pub plugins: HashMap<String, PluginSummary>,
    pub queue_depth: u64,
    pub db_size: u64,
    pub event_count: u64,
    pub uptime_seconds: u64,
}

/// Deep, mutation-independent snapshot of every counter (spec §4.L:
/// "independent of further mutations"), as opposed to [`Metrics::get_summary`]'s
/// derived, status-annotated view.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub events_ingested: u64,
    pub events_by_source: HashMap<String, u64>,
    pub events_by_type: HashMap<String, u64>,
    pub hourly_buckets: HashMap<DateTime<Utc>, u64>,
    pub daily_buckets: HashMap<DateTime<Utc>, u64>,
    pub queue_depth: u64,
    pub db_size: u64,
    pub event_count: u64,
    pub uptime_seconds: u64,
}

struct Inner {
    events_ingested: u64,
    events_by_source: IndexMap<String, u64>,
    events_by_type: IndexMap<String, u64>,
    plugins: HashMap<String, PluginStats>,
    hourly: IndexMap<DateTime<Utc>, u64>,
    daily: IndexMap<DateTime<Utc>, u64>,
    system: SystemMetrics,
}

/// Process-wide metrics accumulator. Cloning [`Metrics`] shares the same
/// underlying state (it's an `Arc`-free `Mutex` wrapper meant to be held
/// behind a single `Arc<Metrics>`).
pub struct Metrics {
    inner: Mutex<Inner>,
    start: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                events_ingested: 0,
                events_by_source: IndexMap::new(),
                events_by_type: IndexMap::new(),
                plugins: HashMap::new(),
                hourly: IndexMap::new(),
                daily: IndexMap::new(),
                system: SystemMetrics::default(),
            }),
            start: Instant::now(),
        }
    }

    pub fn record_event_ingested(&self, source: &str, event_type: &str) {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        inner.events_ingested += 1;
        bump_bounded(&mut inner.events_by_source, source);
        bump_bounded(&mut inner.events_by_type, event_type);

        let hour_bucket = now
            .date_naive()
            .and_hms_opt(now.time().hour(), 0, 0)
            .unwrap_or(now.naive_utc())
            .and_utc();
        *inner.hourly.entry(hour_bucket).or_insert(0) += 1;

        let day_bucket = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or(now.naive_utc())
            .and_utc();
        *inner.daily.entry(day_bucket).or_insert(0) += 1;

        prune_buckets(&mut inner, now);
    }

    /// Record the point-in-time system figures the bucket counters can't
    /// derive on their own, and recompute uptime against process start
    /// (spec §4.L).
    pub fn update_system_metrics(&self, queue_depth: u64, db_size: u64, event_count: u64) {
        let mut inner = self.inner.lock();
        inner.system = SystemMetrics {
            queue_depth,
            db_size,
            event_count,
            uptime_seconds: self.start.elapsed().as_secs(),
        };
    }

    /// Deep snapshot, independent of any mutation made after this call
    /// returns (spec §4.L `copy()`).
    pub fn copy(&self) -> MetricsSnapshot {
        let inner = self.inner.lock();
        MetricsSnapshot {
            events_ingested: inner.events_ingested,
            events_by_source: inner.events_by_source.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            events_by_type: inner.events_by_type.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            hourly_buckets: inner.hourly.iter().map(|(k, v)| (*k, *v)).collect(),
            daily_buckets: inner.daily.iter().map(|(k, v)| (*k, *v)).collect(),
            queue_depth: inner.system.queue_depth,
            db_size: inner.system.db_size,
            event_count: inner.system.event_count,
            uptime_seconds: inner.system.uptime_seconds,
        }
    }

    pub fn record_plugin_start(&self, name: &str) {
        let mut inner = self.inner.lock();
        let stats = inner.plugins.entry(name.to_string()).or_default();
        stats.start_time = Some(Utc::now());
    }

    pub fn record_plugin_error(&self, name: &str, error: impl Into<String>) {
        let mut inner = self.inner.lock();
        let stats = inner.plugins.entry(name.to_string()).or_default();
        stats.error_count += 1;
        stats.last_error = Some((Utc::now(), error.into()));
    }

    pub fn record_plugin_restart(&self, name: &str) {
        let mut inner = self.inner.lock();
        let stats = inner.plugins.entry(name.to_string()).or_default();
        stats.restarts += 1;
        stats.start_time = Some(Utc::now());
    }

    /// Drop hourly buckets older than 48h and daily buckets older than 30
    /// days (spec §4.L: "rolling windows are pruned, not accumulated
    /// forever"). Also run inline at the end of every
    /// [`Self::record_event_ingested`], so this exists as its own method
    /// only for callers (tests, an idle-time sweep) that want to prune
    /// without also recording an event.
    pub fn cleanup_old_buckets(&self) {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        prune_buckets(&mut inner, now);
    }

    pub fn get_summary(&self) -> MetricsSummary {
        let inner = self.inner.lock();
        let now = Utc::now();

        let plugins = inner
            .plugins
            .iter()
            .map(|(name, stats)| {
                let recent_error = stats
                    .last_error
                    .as_ref()
                    .map(|(at, _)| age_of(*at, now) < RECENT_ERROR_WINDOW)
                    .unwrap_or(false);
                let status = if stats.start_time.is_none() {
                    "stopped"
                } else if recent_error {
                    "running (with errors)"
                } else {
                    "running"
                };
                (
                    name.clone(),
                    PluginSummary {
                        start_time: stats.start_time,
                        error_count: stats.error_count,
                        last_error: stats.last_error.as_ref().map(|(_, msg)| msg.clone()),
                        restarts: stats.restarts,
                        status,
                    },
                )
            })
            .collect();

        MetricsSummary {
            events_ingested: inner.events_ingested,
            events_by_source: inner.events_by_source.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            events_by_type: inner.events_by_type.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            plugins,
            queue_depth: inner.system.queue_depth,
            db_size: inner.system.db_size,
            event_count: inner.system.event_count,
            uptime_seconds: inner.system.uptime_seconds,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn bump_bounded(table: &mut IndexMap<String, u64>, key: &str) {
    if !table.contains_key(key) && table.len() >= MAX_TRACKED_KEYS {
        table.shift_remove_index(0);
    }
    *table.entry(key.to_string()).or_insert(0) += 1;
}

fn prune_buckets(inner: &mut Inner, now: DateTime<Utc>) {
    inner.hourly.retain(|bucket, _| age_of(*bucket, now) < BUCKET_TTL_HOURLY);
    inner.daily.retain(|bucket, _| age_of(*bucket, now) < BUCKET_TTL_DAILY);
}

fn age_of(at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let std_at: SystemTime = at.into();
    let std_now: SystemTime = now.into();
    std_now.duration_since(std_at).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
