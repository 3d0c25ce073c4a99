// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The embedded relational store: a single SQLite database file holding
//! the message inbox and the full-text knowledge index, opened in WAL
//! journal mode so readers never block the writer.

use hubd_core::HubError;
use rusqlite::Connection;
use std::path::Path;

/// Schema version this build expects. Bumped whenever `MIGRATIONS` grows.
pub const SCHEMA_VERSION: i64 = 2;

/// One forward-only schema step, applied inside a transaction.
struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: r#"
        CREATE TABLE messages (
            id TEXT PRIMARY KEY,
            to_account TEXT NOT NULL,
            created_at_ms INTEGER NOT NULL,
            read_at_ms INTEGER,
            data TEXT NOT NULL
        );
        CREATE INDEX idx_messages_to_unread ON messages (to_account, read_at_ms);
        CREATE INDEX idx_messages_to_created ON messages (to_account, created_at_ms);

        CREATE VIRTUAL TABLE knowledge_entries_fts USING fts5 (
            id UNINDEXED,
            title,
            content,
            tags,
            tokenize = 'porter unicode61'
        );

        CREATE TABLE knowledge_entries (
            id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '',
            account_name TEXT NOT NULL,
            indexed_at_ms INTEGER NOT NULL
        );

        CREATE TRIGGER knowledge_entries_ai AFTER INSERT ON knowledge_entries BEGIN
            INSERT INTO knowledge_entries_fts (id, title, content, tags) VALUES (new.id, new.title, new.content, new.tags);
        END;
        CREATE TRIGGER knowledge_entries_ad AFTER DELETE ON knowledge_entries BEGIN
            DELETE FROM knowledge_entries_fts WHERE id = old.id;
        END;
        CREATE TRIGGER knowledge_entries_au AFTER UPDATE ON knowledge_entries BEGIN
            DELETE FROM knowledge_entries_fts WHERE id = old.id;
            INSERT INTO knowledge_entries_fts (id, title, content, tags) VALUES (new.id, new.title, new.content, new.tags);
        END;
    "#,
}, Migration {
    version: 2,
    sql: r#"
        CREATE TABLE agent_reputation (
            account TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );
    "#,
}];

/// Opens (creating if absent) the database at `path`, sets WAL journal
/// mode and a busy timeout, and applies any migrations newer than the
/// database's recorded `schema_version`.
pub fn open(path: &Path) -> Result<Connection, HubError> {
    let conn = Connection::open(path).map_err(sqlite_err)?;
    conn.pragma_update(None, "journal_mode", "WAL").map_err(sqlite_err)?;
    conn.pragma_update(None, "busy_timeout", 5_000).map_err(sqlite_err)?;
    conn.pragma_update(None, "foreign_keys", "ON").map_err(sqlite_err)?;

    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .map_err(sqlite_err)?;

    let current: i64 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    if current < SCHEMA_VERSION {
        migrate(&conn, current)?;
    }

    Ok(conn)
}

fn migrate(conn: &Connection, from_version: i64) -> Result<(), HubError> {
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        tracing::info!(version = migration.version, "applying storage migration");
        conn.execute_batch(migration.sql).map_err(sqlite_err)?;
    }
    conn.execute("DELETE FROM schema_version", []).map_err(sqlite_err)?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [SCHEMA_VERSION])
        .map_err(sqlite_err)?;
    Ok(())
}

pub(crate) fn sqlite_err(e: rusqlite::Error) -> HubError {
    HubError::io(e.to_string())
}
