// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full-text knowledge search over SQLite FTS5 (§4.D).
//!
//! User-supplied query text is sanitized before it ever reaches FTS5's MATCH
//! operator: FTS5 query syntax treats bare words as boolean operators
//! (`AND`/`OR`/`NOT`, `^`, `-`, `*`), so an unsanitized query can silently
//! turn into something other than what the caller intended, or error out on
//! a dangling operator. We quote every term individually and drop anything
//! that sanitizes down to nothing rather than let an empty MATCH clause
//! match the whole corpus.

use hubd_core::HubError;
use rusqlite::{params, Connection};

use crate::db::sqlite_err;

/// A category a [`KnowledgeEntry`] can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum KnowledgeCategory {
    Prompt,
    Handoff,
    TaskEvent,
    DecisionNote,
    Message,
}

impl KnowledgeCategory {
    fn as_str(self) -> &'static str {
        match self {
            KnowledgeCategory::Prompt => "prompt",
            KnowledgeCategory::Handoff => "handoff",
            KnowledgeCategory::TaskEvent => "task_event",
            KnowledgeCategory::DecisionNote => "decision_note",
            KnowledgeCategory::Message => "message",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "prompt" => KnowledgeCategory::Prompt,
            "handoff" => KnowledgeCategory::Handoff,
            "task_event" => KnowledgeCategory::TaskEvent,
            "decision_note" => KnowledgeCategory::DecisionNote,
            _ => KnowledgeCategory::Message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeEntry {
    pub id: String,
    pub category: KnowledgeCategory,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub account_name: String,
    pub indexed_at_ms: u64,
}

pub struct SearchIndex<'a> {
    conn: &'a Connection,
}

impl<'a> SearchIndex<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, entry: &KnowledgeEntry) -> Result<(), HubError> {
        self.conn
            .execute(
                "INSERT INTO knowledge_entries (id, category, title, content, tags, account_name, indexed_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.id,
                    entry.category.as_str(),
                    entry.title,
                    entry.content,
                    entry.tags.join(","),
                    entry.account_name,
                    entry.indexed_at_ms as i64
                ],
            )
            .map_err(sqlite_err)?;
        Ok(())
    }

    /// Runs a sanitized full-text query, most-recent match first. Returns
    /// an empty result set (rather than erroring) for a query that
    /// sanitizes down to nothing.
    pub fn query(&self, raw_query: &str, limit: u32) -> Result<Vec<KnowledgeEntry>, HubError> {
        let Some(sanitized) = sanitize_query(raw_query) else {
            return Ok(Vec::new());
        };

        let mut stmt = self
            .conn
            .prepare(
                "SELECT k.id, k.category, k.title, k.content, k.tags, k.account_name, k.indexed_at_ms \
                 FROM knowledge_entries_fts f \
                 JOIN knowledge_entries k ON k.id = f.id \
                 WHERE knowledge_entries_fts MATCH ?1 \
                 ORDER BY k.indexed_at_ms DESC LIMIT ?2",
            )
            .map_err(sqlite_err)?;

        let rows = stmt
            .query_map(params![sanitized, limit], |row| {
                let tags: String = row.get(4)?;
                Ok(KnowledgeEntry {
                    id: row.get(0)?,
                    category: KnowledgeCategory::from_str(&row.get::<_, String>(1)?),
                    title: row.get(2)?,
                    content: row.get(3)?,
                    tags: tags.split(',').filter(|t| !t.is_empty()).map(String::from).collect(),
                    account_name: row.get(5)?,
                    indexed_at_ms: row.get::<_, i64>(6)? as u64,
                })
            })
            .map_err(sqlite_err)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(sqlite_err)?);
        }
        Ok(out)
    }
}

/// Turns free-form user text into a safe FTS5 MATCH expression.
///
/// Splits on whitespace, strips FTS5 operator characters from each term,
/// drops terms that are empty after stripping, and quotes the remainder so
/// FTS5 treats it as a literal rather than re-parsing operator syntax out
/// of it. Returns `None` if nothing usable survives.
fn sanitize_query(raw: &str) -> Option<String> {
    let terms: Vec<String> = raw
        .split_whitespace()
        .map(strip_operator_chars)
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t.replace('"', "")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

fn strip_operator_chars(term: &str) -> String {
    term.chars().filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-').collect()
}
