// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The auto-launcher policy: rate limit, dedup, per-target circuit breaker
//! (§4.I). Decision order is significant and matches the spec exactly —
//! self-handoff, then circuit breaker, then dedup, then rate limit.

use hubd_core::{AutoLaunchRecord, SpawnRecord};

const WINDOW_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct LauncherPolicy {
    pub self_handoff_blocked: bool,
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
    pub deduplication_window_ms: u64,
    pub max_spawns_per_minute: u32,
}

impl Default for LauncherPolicy {
    fn default() -> Self {
        Self {
            self_handoff_blocked: true,
            failure_threshold: 3,
            cooldown_ms: 5 * 60_000,
            deduplication_window_ms: 30_000,
            max_spawns_per_minute: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    SelfHandoff,
    CircuitOpen,
    Dedup,
    RateLimit,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DenyReason::SelfHandoff => "self-handoff",
            DenyReason::CircuitOpen => "circuit breaker open",
            DenyReason::Dedup => "dedup",
            DenyReason::RateLimit => "rate limit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchDecision {
    Allow,
    Deny(DenyReason),
}

impl LauncherPolicy {
    /// `canLaunch(from, target)` per the exact decision order in §4.I.
    pub fn can_launch(&self, record: &mut AutoLaunchRecord, from: &str, target: &str, now_ms: u64) -> LaunchDecision {
        if self.self_handoff_blocked && from == target {
            return LaunchDecision::Deny(DenyReason::SelfHandoff);
        }

        if let Some(breaker) = record.circuit_breakers.get(target).cloned() {
            if breaker.failures >= self.failure_threshold {
                let opened_at = breaker.opened_at_ms.unwrap_or(now_ms);
                if now_ms.saturating_sub(opened_at) < self.cooldown_ms {
                    return LaunchDecision::Deny(DenyReason::CircuitOpen);
                }
                // Cooldown expired: half-open, clear the breaker.
                record.circuit_breakers.remove(target);
            }
        }

        if let Some(&last) = record.last_spawn_by_target.get(target) {
            if now_ms.saturating_sub(last) < self.deduplication_window_ms {
                return LaunchDecision::Deny(DenyReason::Dedup);
            }
        }

        record.recent_spawns.retain(|spawn| now_ms.saturating_sub(spawn.timestamp_ms) < WINDOW_MS);
        if record.recent_spawns.len() as u32 >= self.max_spawns_per_minute {
            return LaunchDecision::Deny(DenyReason::RateLimit);
        }

        LaunchDecision::Allow
    }

    /// Records a successful spawn: clears the target's failure count and
    /// updates both the rate-limit window and the dedup timestamp.
    pub fn record_spawn(&self, record: &mut AutoLaunchRecord, target: &str, now_ms: u64) {
        record.circuit_breakers.remove(target);
        record.last_spawn_by_target.insert(target.to_string(), now_ms);
        record.recent_spawns.push(SpawnRecord { target: target.to_string(), timestamp_ms: now_ms });
    }

    /// Records a launch failure, opening the breaker once `failure_threshold` is reached.
    pub fn record_failure(&self, record: &mut AutoLaunchRecord, target: &str, now_ms: u64) {
        let breaker = record.circuit_breakers.entry(target.to_string()).or_default();
        breaker.failures += 1;
        if breaker.failures >= self.failure_threshold && breaker.opened_at_ms.is_none() {
            breaker.opened_at_ms = Some(now_ms);
        }
    }

    /// `reinstate_agent`: clears a target's circuit breaker outright.
    pub fn reinstate(&self, record: &mut AutoLaunchRecord, target: &str) {
        record.circuit_breakers.remove(target);
    }
}

/// Deterministic test hooks mirroring this lineage's `test-support`
/// feature convention — force windows to have already elapsed instead of
/// sleeping in a test.
#[cfg(any(test, feature = "test-support"))]
impl LauncherPolicy {
    pub fn expire_rate_limit_for_test(&self, record: &mut AutoLaunchRecord) {
        record.recent_spawns.clear();
    }

    pub fn expire_dedup_for_test(&self, record: &mut AutoLaunchRecord, target: &str) {
        record.last_spawn_by_target.remove(target);
    }

    pub fn expire_circuit_breaker_for_test(&self, record: &mut AutoLaunchRecord, target: &str) {
        if let Some(breaker) = record.circuit_breakers.get_mut(target) {
            breaker.opened_at_ms = Some(0);
        }
    }
}
