// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat-message requests (§4.D): `send_message`, `read_messages`,
//! `count_unread`, `list_accounts`, `archive_messages`.

use hubd_core::{Clock, HubResult, Message};
use hubd_storage::{MessageStore, DEFAULT_PAGE_SIZE};
use serde_json::{json, Value};

use crate::state::DaemonState;

pub fn send_message<C: Clock>(state: &DaemonState<C>, from: &str, to: &str, content: &str) -> HubResult<Value> {
    let now = state.clock.epoch_ms();
    let message = Message::new_chat(from, to, content, now);

    let db = state.db.lock();
    MessageStore::new(&db).append(&message)?;
    drop(db);

    let delivered = state.connections.lock().contains_key(to);
    Ok(json!({"delivered": delivered, "queued": !delivered}))
}

/// Returns the account's unread messages, then marks them read — a
/// `count_unread` right after this call returns `0` (§8).
pub fn read_messages<C: Clock>(
    state: &DaemonState<C>,
    account: &str,
    limit: Option<u32>,
    offset: Option<u32>,
) -> HubResult<Value> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = offset.unwrap_or(0);
    let now = state.clock.epoch_ms();

    let db = state.db.lock();
    let store = MessageStore::new(&db);
    let messages = store.get_unread(account, limit, offset)?;
    store.mark_all_read(account, now)?;

    Ok(json!({"messages": messages}))
}

pub fn count_unread<C: Clock>(state: &DaemonState<C>, account: &str) -> HubResult<Value> {
    let db = state.db.lock();
    let count = MessageStore::new(&db).count_unread(account)?;
    Ok(json!({"count": count}))
}

pub fn list_accounts<C: Clock>(state: &DaemonState<C>) -> HubResult<Value> {
    let config = state.config.read();
    let connected = state.connections.lock();
    let accounts: Vec<Value> = config
        .accounts
        .iter()
        .map(|account| {
            json!({
                "name": account.name,
                "provider": account.provider,
                "connected": connected.contains_key(&account.name),
            })
        })
        .collect();
    Ok(json!({"accounts": accounts}))
}

pub fn archive_messages<C: Clock>(state: &DaemonState<C>, days: u32) -> HubResult<Value> {
    let now = state.clock.epoch_ms();
    let cutoff = now.saturating_sub(u64::from(days) * 86_400_000);

    let db = state.db.lock();
    let archived = MessageStore::new(&db).archive_older_than(cutoff)?;
    Ok(json!({"archived": archived}))
}
