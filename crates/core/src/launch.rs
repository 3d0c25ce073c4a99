// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auto-launcher data shapes (§3, §4.I). The policy logic lives in
//! `hubd-engine::launcher`; this crate only defines the state shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub target: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CircuitState {
    pub failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at_ms: Option<u64>,
}

/// Transient per-daemon auto-launcher bookkeeping. Never persisted across
/// restarts — a fresh daemon starts with an empty record, per §3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoLaunchRecord {
    pub recent_spawns: Vec<SpawnRecord>,
    pub last_spawn_by_target: HashMap<String, u64>,
    pub circuit_breakers: HashMap<String, CircuitState>,
}
