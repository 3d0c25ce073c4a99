// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The inbox store: append, read, count, and archive messages (§4.D).

use hubd_core::{HubError, Message};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::sqlite_err;

/// Default page size for `get_unread`/`get_all` when the caller doesn't
/// specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

pub struct MessageStore<'a> {
    conn: &'a Connection,
}

impl<'a> MessageStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn append(&self, message: &Message) -> Result<(), HubError> {
        let data = serde_json::to_string(message)?;
        self.conn
            .execute(
                "INSERT INTO messages (id, to_account, created_at_ms, read_at_ms, data) VALUES (?1, ?2, ?3, NULL, ?4)",
                params![message.id.as_str(), message.to, message.timestamp_ms as i64, data],
            )
            .map_err(sqlite_err)?;
        Ok(())
    }

    pub fn get_unread(&self, account: &str, limit: u32, offset: u32) -> Result<Vec<Message>, HubError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT data FROM messages WHERE to_account = ?1 AND read_at_ms IS NULL \
                 ORDER BY created_at_ms ASC LIMIT ?2 OFFSET ?3",
            )
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map(params![account, limit, offset], |row| row.get::<_, String>(0))
            .map_err(sqlite_err)?;
        decode_rows(rows)
    }

    pub fn get_all(&self, account: &str, limit: u32, offset: u32) -> Result<Vec<Message>, HubError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT data FROM messages WHERE to_account = ?1 \
                 ORDER BY created_at_ms ASC LIMIT ?2 OFFSET ?3",
            )
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map(params![account, limit, offset], |row| row.get::<_, String>(0))
            .map_err(sqlite_err)?;
        decode_rows(rows)
    }

    /// Marks every unread message for `account` as read, both the `read_at_ms`
    /// column used for the unread-count queries and the `read` flag baked
    /// into each message's serialized `data`, so a subsequent `get_all`
    /// reflects the change too.
    pub fn mark_all_read(&self, account: &str, now_ms: u64) -> Result<u64, HubError> {
        let unread = self.get_unread(account, u32::MAX, 0)?;
        for mut message in unread.clone() {
            message.read = true;
            let data = serde_json::to_string(&message)?;
            self.conn
                .execute("UPDATE messages SET data = ?1 WHERE id = ?2", params![data, message.id.as_str()])
                .map_err(sqlite_err)?;
        }

        let affected = self
            .conn
            .execute(
                "UPDATE messages SET read_at_ms = ?1 WHERE to_account = ?2 AND read_at_ms IS NULL",
                params![now_ms as i64, account],
            )
            .map_err(sqlite_err)?;
        Ok(affected as u64)
    }

    pub fn count_unread(&self, account: &str) -> Result<u64, HubError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE to_account = ?1 AND read_at_ms IS NULL",
                params![account],
                |row| row.get(0),
            )
            .map_err(sqlite_err)?;
        Ok(count as u64)
    }

    /// Deletes read messages older than `older_than_ms`. Unread messages
    /// are never archived regardless of age.
    pub fn archive_older_than(&self, older_than_ms: u64) -> Result<u64, HubError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM messages WHERE read_at_ms IS NOT NULL AND created_at_ms < ?1",
                params![older_than_ms as i64],
            )
            .map_err(sqlite_err)?;
        Ok(affected as u64)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Message>, HubError> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM messages WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(sqlite_err)?;
        data.map(|d| serde_json::from_str(&d).map_err(HubError::from)).transpose()
    }
}

fn decode_rows(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<String>>,
) -> Result<Vec<Message>, HubError> {
    let mut out = Vec::new();
    for row in rows {
        let data = row.map_err(sqlite_err)?;
        out.push(serde_json::from_str(&data)?);
    }
    Ok(out)
}
