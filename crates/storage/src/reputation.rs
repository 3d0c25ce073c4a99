// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted trust/reputation records (§4.H). One row per account in the
//! same embedded store as messages, upserted whenever a task reaches
//! `TASK_COMPLETED`.

use hubd_core::{AgentReputation, HubError};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::sqlite_err;

pub struct ReputationStore<'a> {
    conn: &'a Connection,
}

impl<'a> ReputationStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, account: &str) -> Result<Option<AgentReputation>, HubError> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM agent_reputation WHERE account = ?1", params![account], |row| row.get(0))
            .optional()
            .map_err(sqlite_err)?;
        data.map(|d| serde_json::from_str(&d).map_err(HubError::from)).transpose()
    }

    /// Loads the stored reputation for `account`, or a fresh one at the
    /// midpoint trust score if this is its first appearance.
    pub fn get_or_fresh(&self, account: &str, now_ms: u64) -> Result<AgentReputation, HubError> {
        Ok(self.get(account)?.unwrap_or_else(|| AgentReputation::fresh(account, now_ms)))
    }

    pub fn upsert(&self, reputation: &AgentReputation) -> Result<(), HubError> {
        let data = serde_json::to_string(reputation)?;
        self.conn
            .execute(
                "INSERT INTO agent_reputation (account, data) VALUES (?1, ?2) \
                 ON CONFLICT(account) DO UPDATE SET data = excluded.data",
                params![reputation.account, data],
            )
            .map_err(sqlite_err)?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<AgentReputation>, HubError> {
        let mut stmt = self.conn.prepare("SELECT data FROM agent_reputation").map_err(sqlite_err)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0)).map_err(sqlite_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(serde_json::from_str(&row.map_err(sqlite_err)?)?);
        }
        Ok(out)
    }
}
