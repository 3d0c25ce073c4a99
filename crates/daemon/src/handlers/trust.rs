// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `get_trust` and `suggest_assignee` (§4.H).

use hubd_core::{Clock, HubResult, Task, TaskStatus};
use hubd_engine::{trust, AssigneeCandidate};
use hubd_storage::ReputationStore;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::state::DaemonState;

pub fn get_trust<C: Clock>(state: &DaemonState<C>, account: &str) -> HubResult<Value> {
    let now = state.clock.epoch_ms();
    let db = state.db.lock();
    let reputation = ReputationStore::new(&db).get_or_fresh(account, now)?;
    Ok(serde_json::to_value(reputation)?)
}

/// Ranks configured accounts for a handoff (§4.H): capability match against
/// `required_skills`, rolling reputation, completion speed, and recency —
/// with excluded and quarantined accounts filtered out before scoring.
pub fn suggest_assignee<C: Clock>(
    state: &DaemonState<C>,
    required_skills: Vec<String>,
    exclude_accounts: Vec<String>,
) -> HubResult<Value> {
    let now = state.clock.epoch_ms();
    let excluded: HashSet<String> = exclude_accounts.iter().map(|s| s.to_lowercase()).collect();

    let config = state.config.read();
    let archived = state.journal.list_archived()?;
    let db = state.db.lock();
    let reputation_store = ReputationStore::new(&db);

    let mut candidates = Vec::with_capacity(config.accounts.len());
    for account in &config.accounts {
        let reputation = reputation_store.get_or_fresh(&account.name, now)?;
        let history: Vec<&Task> =
            archived.iter().filter(|t| t.assignee == account.name && t.status == TaskStatus::Accepted).collect();

        candidates.push(AssigneeCandidate {
            account: account.name.clone(),
            capabilities: account.capabilities.clone(),
            reputation,
            median_completion_minutes: median_completion_minutes(&history),
            last_accepted_at_ms: history.iter().map(|t| t.updated_at_ms).max(),
            quarantined: state.is_quarantined(&account.name),
            excluded: excluded.contains(&account.key()),
        });
    }
    drop(db);
    drop(config);

    let ranked = trust::suggest_assignee(&required_skills, &candidates, now);
    Ok(json!({"candidates": ranked}))
}

fn median_completion_minutes(history: &[&Task]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let mut minutes: Vec<f64> =
        history.iter().map(|t| t.updated_at_ms.saturating_sub(t.created_at_ms) as f64 / 60_000.0).collect();
    minutes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(minutes[minutes.len() / 2])
}
