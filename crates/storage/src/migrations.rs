// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numbered schema migrations, applied in order inside a transaction
//! (spec §4.B "Schema evolution").

/// Current schema version this binary understands. If the database's
/// `user_version` is higher, the engine refuses to open it.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// `(version, sql)` pairs applied in order. Each script runs in its own
/// transaction as part of [`crate::engine::StorageEngine::open`].
pub const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    r#"
    CREATE TABLE events (
        version   INTEGER NOT NULL,
        id        TEXT NOT NULL PRIMARY KEY,
        timestamp TEXT NOT NULL,
        source    TEXT NOT NULL,
        type      TEXT NOT NULL,
        repo      TEXT,
        branch    TEXT,
        payload   TEXT NOT NULL
    );

    CREATE INDEX idx_events_source_timestamp ON events (source, timestamp);
    CREATE INDEX idx_events_timestamp ON events (timestamp);
    CREATE INDEX idx_events_repo_timestamp ON events (repo, timestamp) WHERE repo IS NOT NULL;
    CREATE INDEX idx_events_branch_timestamp ON events (branch, timestamp) WHERE branch IS NOT NULL;

    CREATE VIRTUAL TABLE events_fts USING fts5(
        id UNINDEXED,
        text_projection,
        repo,
        branch,
        content=''
    );

    CREATE TRIGGER events_ai AFTER INSERT ON events BEGIN
        INSERT INTO events_fts(rowid, id, text_projection, repo, branch)
        VALUES (
            new.rowid,
            new.id,
            COALESCE(
                NULLIF(json_extract(new.payload, '$.message'), ''),
                NULLIF(json_extract(new.payload, '$.command'), ''),
                NULLIF(json_extract(new.payload, '$.text'), ''),
                NULLIF(json_extract(new.payload, '$.summary'), ''),
                new.type
            ),
            new.repo,
            new.branch
        );
    END;

    CREATE TRIGGER events_ad AFTER DELETE ON events BEGIN
        INSERT INTO events_fts(events_fts, rowid, id, text_projection, repo, branch)
        VALUES (
            'delete',
            old.rowid,
            old.id,
            COALESCE(
                NULLIF(json_extract(old.payload, '$.message'), ''),
                NULLIF(json_extract(old.payload, '$.command'), ''),
                NULLIF(json_extract(old.payload, '$.text'), ''),
                NULLIF(json_extract(old.payload, '$.summary'), ''),
                old.type
            ),
            old.repo,
            old.branch
        );
    END;
    "#,
)];
