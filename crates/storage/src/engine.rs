// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The embedded storage engine (spec §4.B).
//!
//! A single SQLite connection (WAL journal mode) behind a mutex. Writes are
//! serialised by the mutex; reads share the same connection since WAL mode
//! lets readers proceed without blocking on the (brief) writer.

use std::path::Path;

use chrono::{DateTime, Utc};
use devlog_core::Event;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::migrations::{CURRENT_SCHEMA_VERSION, MIGRATIONS};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("schema version {found} is newer than this binary supports ({supported})")]
    SchemaMismatch { found: u32, supported: u32 },

    #[error("io error: {0}")]
    Io(#[from] rusqlite::Error),

    #[error("malformed stored event: {0}")]
    Malformed(String),
}

/// Sort order for [`StorageEngine::query`] / [`StorageEngine::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    TimeDesc,
    TimeAsc,
    /// Only meaningful for `search`; falls back to `TimeDesc` for `query`.
    Relevance,
}

/// Default row limit when a caller passes `limit = 0` (spec §8: "`query`
/// with `limit=0` is treated as the default (10)").
pub const DEFAULT_LIMIT: u32 = 10;

/// Options shared by `query` and `search` (spec §4.B).
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub source: Option<String>,
    pub event_type: Option<String>,
    pub repo_pattern: Option<String>,
    pub branch_pattern: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: u32,
    pub offset: u32,
    pub sort_order: SortOrder,
}

/// `query` options plus a full-text query string (spec §4.B).
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub base: QueryOptions,
    /// `"*"` or empty matches every event.
    pub query_string: String,
}

impl QueryOptions {
    fn effective_limit(&self) -> u32 {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }
}

/// The embedded event store.
pub struct StorageEngine {
    conn: Mutex<Connection>,
}

impl StorageEngine {
    /// Open (creating if absent) the database at `path`, running any
    /// pending migrations. Refuses to open a database with a schema
    /// version newer than this binary supports.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory engine for tests.
    #[cfg(any(test, feature = "test-support"))]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> Result<(), StorageError> {
        let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if current > CURRENT_SCHEMA_VERSION {
            return Err(StorageError::SchemaMismatch {
                found: current,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        for (version, sql) in MIGRATIONS {
            if *version <= current {
                continue;
            }
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
        }

        Ok(())
    }

    /// Insert an event. At-most-once for a given id: a duplicate primary
    /// key yields [`StorageError::DuplicateId`] rather than touching the
    /// existing row (spec §4.B / §8 invariant 1).
    pub fn insert(&self, event: &Event) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&event.payload)
            .map_err(|e| StorageError::Malformed(e.to_string()))?;

        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO events (version, id, timestamp, source, type, repo, branch, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.version,
                event.id,
                event.timestamp.to_rfc3339(),
                event.source,
                event.event_type,
                event.repo,
                event.branch,
                payload,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::DuplicateId(event.id.clone()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Ordered sequence of events matching `options` (spec §4.B).
    pub fn query(&self, options: &QueryOptions) -> Result<Vec<Event>, StorageError> {
        let conn = self.conn.lock();
        let (where_clause, sql_params) = build_where(options, None);
        let order_by = match options.sort_order {
            SortOrder::TimeAsc => "timestamp ASC",
            _ => "timestamp DESC",
        };
        let sql = format!(
            "SELECT version, id, timestamp, source, type, repo, branch, payload
             FROM events
             {where_clause}
             ORDER BY {order_by}
             LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
            limit_idx = sql_params.len() + 1,
            offset_idx = sql_params.len() + 2,
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut all_params = sql_params;
        all_params.push(Box::new(options.effective_limit()));
        all_params.push(Box::new(options.offset));

        let rows = stmt.query_map(
            rusqlite::params_from_iter(all_params.iter().map(|p| p.as_ref())),
            row_to_event,
        )?;

        collect_events(rows)
    }

    /// Same as [`Self::query`] plus a full-text `query_string` match
    /// against the text projection (spec §4.B).
    pub fn search(&self, options: &SearchOptions) -> Result<Vec<Event>, StorageError> {
        let query = options.query_string.trim();
        if query.is_empty() || query == "*" {
            return self.query(&options.base);
        }

        let conn = self.conn.lock();
        let (extra_where, sql_params) = build_where(&options.base, Some("e."));

        let order_by = match options.base.sort_order {
            SortOrder::TimeAsc => "e.timestamp ASC".to_string(),
            SortOrder::TimeDesc => "e.timestamp DESC".to_string(),
            SortOrder::Relevance => "rank".to_string(),
        };

        let where_extra = if extra_where.is_empty() {
            String::new()
        } else {
            format!(" AND {}", extra_where.trim_start_matches("WHERE "))
        };

        let sql = format!(
            "SELECT e.version, e.id, e.timestamp, e.source, e.type, e.repo, e.branch, e.payload
             FROM events_fts f
             JOIN events e ON e.rowid = f.rowid
             WHERE events_fts MATCH ?1 {where_extra}
             ORDER BY {order_by}
             LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
            limit_idx = sql_params.len() + 2,
            offset_idx = sql_params.len() + 3,
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(fts_query(query))];
        all_params.extend(sql_params);
        all_params.push(Box::new(options.base.effective_limit()));
        all_params.push(Box::new(options.base.offset));

        let rows = stmt.query_map(
            rusqlite::params_from_iter(all_params.iter().map(|p| p.as_ref())),
            row_to_event,
        )?;

        collect_events(rows)
    }

    /// Total event count.
    pub fn count(&self) -> Result<u64, StorageError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0))?;
        Ok(count as u64)
    }

    /// Flush and release. SQLite in WAL mode checkpoints on close; this
    /// just drops the connection explicitly so callers can observe I/O
    /// errors instead of relying on an implicit `Drop`.
    pub fn close(self) -> Result<(), StorageError> {
        let conn = self.conn.into_inner();
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    /// Row count of the underlying SQLite file, used by metrics
    /// (spec §4.L `update_system_metrics`). Returns `None` for in-memory
    /// databases.
    pub fn db_size_bytes(&self) -> Option<u64> {
        let conn = self.conn.lock();
        let path: Option<String> = conn
            .query_row("PRAGMA database_list", [], |row| row.get(2))
            .optional()
            .ok()
            .flatten();
        path.filter(|p| !p.is_empty())
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
    }
}

fn fts_query(query: &str) -> String {
    // Quote each token so punctuation in a shell command or message
    // doesn't get parsed as FTS5 query syntax.
    query
        .split_whitespace()
        .map(|tok| format!("\"{}\"", tok.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_where(
    options: &QueryOptions,
    prefix: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let p = prefix.unwrap_or("");
    let mut clauses = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(source) = &options.source {
        clauses.push(format!("{p}source = ?{}", params.len() + 1));
        params.push(Box::new(source.clone()));
    }
    if let Some(t) = &options.event_type {
        clauses.push(format!("{p}type = ?{}", params.len() + 1));
        params.push(Box::new(t.clone()));
    }
    if let Some(pat) = &options.repo_pattern {
        clauses.push(format!("{p}repo LIKE ?{}", params.len() + 1));
        params.push(Box::new(pat.clone()));
    }
    if let Some(pat) = &options.branch_pattern {
        clauses.push(format!("{p}branch LIKE ?{}", params.len() + 1));
        params.push(Box::new(pat.clone()));
    }
    if let Some(start) = options.start_time {
        clauses.push(format!("{p}timestamp >= ?{}", params.len() + 1));
        params.push(Box::new(start.to_rfc3339()));
    }
    if let Some(end) = options.end_time {
        clauses.push(format!("{p}timestamp <= ?{}", params.len() + 1));
        params.push(Box::new(end.to_rfc3339()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    (where_clause, params)
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    let timestamp_str: String = row.get(2)?;
    let payload_str: String = row.get(7)?;
    Ok(Event {
        version: row.get(0)?,
        id: row.get(1)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        source: row.get(3)?,
        event_type: row.get(4)?,
        repo: row.get(5)?,
        branch: row.get(6)?,
        payload: serde_json::from_str(&payload_str).unwrap_or_default(),
    })
}

fn collect_events(
    rows: impl Iterator<Item = rusqlite::Result<Event>>,
) -> Result<Vec<Event>, StorageError> {
    rows.map(|r| r.map_err(StorageError::Io)).collect()
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
