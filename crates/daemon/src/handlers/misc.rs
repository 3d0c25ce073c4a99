// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auth`, `ping`, `config_reload`, `health_check` (§4.A, §6) — the four
//! request types permitted on an unauthenticated connection.

use hubd_core::{Clock, DelegationEvent, HubError, HubResult};
use serde_json::{json, Value};

use crate::config::Config;
use crate::env;
use crate::listener::Session;
use crate::state::DaemonState;

/// Authenticates `account` against its token file and makes this
/// connection the current one for that account (§3, §4.A). A previously
/// current connection for the same account is cancelled and, if one
/// existed, `ACCOUNT_SUPERSEDED` is published for it.
pub fn auth<C: Clock>(state: &DaemonState<C>, session: &mut Session, account: &str, token: &str) -> HubResult<Value> {
    let account_name = {
        let config = state.config.read();
        let known = config
            .find_account(account)
            .ok_or_else(|| HubError::unauthorized(format!("unknown account '{account}'")))?;
        known.name.clone()
    };

    let expected = hubd_wire::read_token_file(&state.token_path(&account_name))?;
    if !hubd_wire::tokens_match(&expected, token) {
        return Err(HubError::unauthorized("invalid token"));
    }

    let had_previous = state.connections.lock().contains_key(&account_name);
    let id = state.supersede_connection(&account_name, session.cancellation.clone());
    session.account = Some(account_name.clone());
    session.connection_id = id;

    if had_previous {
        state.event_bus.publish(DelegationEvent::AccountSuperseded {
            account: account_name,
            timestamp_ms: state.clock.epoch_ms(),
        });
    }

    Ok(Value::Null)
}

pub fn ping() -> HubResult<Value> {
    Ok(Value::Null)
}

/// Reloads accounts, features, and theme from disk (§6). Policy knobs
/// already baked into `launcher_policy` at startup are not re-derived —
/// changing them requires a restart.
pub fn config_reload<C: Clock>(state: &DaemonState<C>) -> HubResult<Value> {
    let config = Config::load(&env::config_path(&state.base_dir))?;
    let accounts: Vec<String> = config.accounts.iter().map(|a| a.name.clone()).collect();
    *state.config.write() = config;
    Ok(json!({"reloaded": true, "accounts": accounts}))
}

pub fn health_check<C: Clock>(state: &DaemonState<C>) -> HubResult<Value> {
    let uptime_ms = state.clock.epoch_ms().saturating_sub(state.started_at_ms);
    let connected_accounts: Vec<String> = state.connections.lock().keys().cloned().collect();
    Ok(json!({
        "uptime": uptime_ms,
        "connectedAccounts": connected_accounts,
    }))
}
