// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trust/reputation scoring and capability-based assignee suggestion (§4.H).

use hubd_core::AgentReputation;

const HOUR_MS: f64 = 3_600_000.0;

/// Rolling-average smoothing weight applied to each new completion sample.
/// Low enough that one bad task doesn't tank a long history, high enough
/// that a new agent's score moves quickly on its first few samples.
const SAMPLE_WEIGHT: f64 = 0.2;

/// Updates an assignee's rolling reputation on `TASK_COMPLETED` (§4.H).
///
/// `sla_breached` reflects whether the task accumulated an `escalate`
/// recommendation at any point during its life — SLA compliance is
/// derived from the presence/absence of escalations, not a separate signal.
pub fn update_on_completion(rep: &mut AgentReputation, accepted: bool, sla_breached: bool, now_ms: u64) {
    let samples = rep.recent_samples as f64;
    rep.completion_rate = blend(rep.completion_rate, 1.0, samples);
    rep.acceptance_rate = blend(rep.acceptance_rate, if accepted { 1.0 } else { 0.0 }, samples);
    rep.sla_compliance_rate = blend(rep.sla_compliance_rate, if sla_breached { 0.0 } else { 1.0 }, samples);

    let delta = if accepted { 5.0 } else { -10.0 } + if sla_breached { -5.0 } else { 2.0 };
    rep.trust_score = (rep.trust_score + delta * SAMPLE_WEIGHT).clamp(0.0, 100.0);

    rep.recent_samples = rep.recent_samples.saturating_add(1);
    rep.last_updated_at_ms = now_ms;
}

fn blend(current: f64, sample: f64, prior_samples: f64) -> f64 {
    if prior_samples == 0.0 {
        sample
    } else {
        current * (1.0 - SAMPLE_WEIGHT) + sample * SAMPLE_WEIGHT
    }
}

/// A candidate assignee as seen by `suggest_assignee`: declared
/// capabilities, rolling reputation, and enough history to compute
/// `speedFactor` and `recencyBoost`.
#[derive(Debug, Clone)]
pub struct AssigneeCandidate {
    pub account: String,
    pub capabilities: Vec<String>,
    pub reputation: AgentReputation,
    /// Median minutes to complete past tasks; `None` for a candidate with no history.
    pub median_completion_minutes: Option<f64>,
    /// Epoch ms of the candidate's most recently accepted task, if any.
    pub last_accepted_at_ms: Option<u64>,
    pub quarantined: bool,
    pub excluded: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AssigneeScore {
    pub account: String,
    pub score: f64,
    pub skill_match: f64,
    pub success_rate: f64,
    pub speed_factor: f64,
    pub recency_boost: f64,
}

/// Ranks candidates for `suggest_assignee` per the §4.H weighting:
/// `0.4*skillMatch + 0.3*successRate + 0.2*speedFactor + 0.1*recencyBoost`.
/// Excluded accounts and quarantined agents never appear in the result.
pub fn suggest_assignee(required_skills: &[String], candidates: &[AssigneeCandidate], now_ms: u64) -> Vec<AssigneeScore> {
    let mut scored: Vec<AssigneeScore> = candidates
        .iter()
        .filter(|c| !c.excluded && !c.quarantined)
        .map(|c| {
            let skill_match = skill_match(required_skills, &c.capabilities);
            let success_rate = c.reputation.acceptance_rate;
            let speed_factor = speed_factor(c.median_completion_minutes);
            let recency_boost = recency_boost(c.last_accepted_at_ms, now_ms);
            let score = 0.4 * skill_match + 0.3 * success_rate + 0.2 * speed_factor + 0.1 * recency_boost;
            AssigneeScore { account: c.account.clone(), score, skill_match, success_rate, speed_factor, recency_boost }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

fn skill_match(required: &[String], declared: &[String]) -> f64 {
    if required.is_empty() {
        return 1.0;
    }
    let declared_lower: std::collections::HashSet<String> = declared.iter().map(|s| s.to_lowercase()).collect();
    let matched = required.iter().filter(|s| declared_lower.contains(&s.to_lowercase())).count();
    matched as f64 / required.len() as f64
}

/// Faster candidates score higher; an hour is treated as a reasonably good
/// baseline and speed tapers off smoothly past it rather than dropping to
/// zero, so a slightly-slower-than-average agent isn't shut out entirely.
fn speed_factor(median_completion_minutes: Option<f64>) -> f64 {
    match median_completion_minutes {
        None => 0.5,
        Some(minutes) if minutes <= 0.0 => 1.0,
        Some(minutes) => (60.0 / (60.0 + minutes)).clamp(0.0, 1.0),
    }
}

/// Decays linearly from 1.0 at zero hours since the last accepted task to
/// 0.0 at 7 days (168h) and beyond; `None` (no history) scores 0.
fn recency_boost(last_accepted_at_ms: Option<u64>, now_ms: u64) -> f64 {
    const DECAY_WINDOW_HOURS: f64 = 168.0;
    match last_accepted_at_ms {
        None => 0.0,
        Some(last) => {
            let hours_since = now_ms.saturating_sub(last) as f64 / HOUR_MS;
            (1.0 - hours_since / DECAY_WINDOW_HOURS).clamp(0.0, 1.0)
        }
    }
}
