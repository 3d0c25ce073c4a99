// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `check_circuit_breaker` and `reinstate_agent` (§4.I). The launcher's
//! own decision to spawn an agent happens outside this daemon's wire
//! surface; these two requests only expose and reset the breaker state
//! the policy accumulates.

use hubd_core::{Clock, HubResult};
use serde_json::{json, Value};

use crate::state::DaemonState;

pub fn check_circuit_breaker<C: Clock>(state: &DaemonState<C>, target: &str) -> HubResult<Value> {
    let record = state.launch_record.lock();
    let breaker = record.circuit_breakers.get(target).cloned().unwrap_or_default();
    let open = breaker.failures >= state.launcher_policy.failure_threshold;
    Ok(json!({
        "target": target,
        "failures": breaker.failures,
        "openedAt": breaker.opened_at_ms,
        "open": open,
    }))
}

pub fn reinstate_agent<C: Clock>(state: &DaemonState<C>, target: &str) -> HubResult<Value> {
    let mut record = state.launch_record.lock();
    state.launcher_policy.reinstate(&mut record, target);
    Ok(json!({"target": target, "reinstated": true}))
}
