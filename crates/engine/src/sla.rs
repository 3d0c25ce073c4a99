// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SLA / adaptive progress monitoring (§4.F).
//!
//! One pure function maps `(criticality, age, percent, quarantined)` to a
//! graduated recommendation. Both the client-triggered `adaptive_sla_check`
//! RPC and the daemon's internal periodic tick call this same function, so
//! the threshold lattice is defined exactly once.

use hubd_core::{Criticality, ProgressReport, Task, TaskStatus};

/// Graduated SLA recommendations, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaRecommendation {
    None,
    Ping,
    Reassign,
    Quarantine,
    Escalate,
}

hubd_core::simple_display! {
    SlaRecommendation {
        None => "none",
        Ping => "ping",
        Reassign => "reassign",
        Quarantine => "quarantine",
        Escalate => "escalate",
    }
}

const MINUTE_MS: u64 = 60_000;

/// Evaluates the stale-task lattice in §4.F for a single in-flight task.
///
/// `age_ms` is `now - max(task.updated_at_ms, latest_progress.reported_at_ms)`
/// — whichever is the more recent sign of life. `quarantined` reflects
/// whether the assignee has been recently quarantined by the trust store
/// (§4.I), which short-circuits straight to `escalate` regardless of age.
pub fn evaluate(age_ms: u64, criticality: Criticality, percent: u8, quarantined: bool) -> SlaRecommendation {
    if quarantined {
        return SlaRecommendation::Escalate;
    }

    let age_min = age_ms / MINUTE_MS;

    match criticality {
        Criticality::Critical => {
            if age_min >= 30 {
                SlaRecommendation::Escalate
            } else if age_min >= 15 {
                SlaRecommendation::Reassign
            } else if age_min >= 5 {
                SlaRecommendation::Ping
            } else {
                SlaRecommendation::None
            }
        }
        Criticality::High => {
            if age_min >= 120 {
                SlaRecommendation::Escalate
            } else if age_min >= 60 {
                SlaRecommendation::Reassign
            } else if age_min >= 15 {
                SlaRecommendation::Ping
            } else {
                SlaRecommendation::None
            }
        }
        Criticality::Medium => {
            if age_min > 240 {
                SlaRecommendation::Reassign
            } else if age_min > 60 && percent < 25 {
                SlaRecommendation::Ping
            } else {
                SlaRecommendation::None
            }
        }
        Criticality::Low => {
            if age_min >= 240 {
                SlaRecommendation::Ping
            } else {
                SlaRecommendation::None
            }
        }
    }
}

/// The `(task_id, recommendation, reason)` shape returned to callers of
/// `adaptive_sla_check`. `reason` is a short human-readable label, not a
/// stable wire code — callers act on `recommendation`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SlaAssessment {
    pub task_id: hubd_core::TaskId,
    pub recommendation: SlaRecommendation,
    pub age_ms: u64,
    pub reason: String,
}

/// Scans every in-flight (`in_progress` or `ready_for_review`) task and
/// returns a recommendation for each, per §4.F. `latest_progress` looks up
/// the most recent [`ProgressReport`] for a task, if any. `quarantined`
/// reports whether an assignee has been recently quarantined (§4.I).
pub fn scan<'a>(
    now_ms: u64,
    tasks: impl IntoIterator<Item = &'a Task>,
    latest_progress: impl Fn(&hubd_core::TaskId) -> Option<ProgressReport>,
    quarantined: impl Fn(&str) -> bool,
) -> Vec<SlaAssessment> {
    let mut out = Vec::new();
    for task in tasks {
        if !matches!(task.status, TaskStatus::InProgress | TaskStatus::ReadyForReview) {
            continue;
        }
        let progress = latest_progress(&task.id);
        let last_activity_ms = progress.as_ref().map(|p| p.reported_at_ms).unwrap_or(task.updated_at_ms).max(task.updated_at_ms);
        let age_ms = now_ms.saturating_sub(last_activity_ms);
        let percent = progress.as_ref().map(|p| p.clamped_percent()).unwrap_or(0);
        let criticality = task.payload.criticality.unwrap_or(Criticality::Medium);
        let is_quarantined = quarantined(&task.assignee);

        let recommendation = evaluate(age_ms, criticality, percent, is_quarantined);
        if recommendation == SlaRecommendation::None {
            continue;
        }
        let reason = if is_quarantined {
            format!("assignee {} is quarantined", task.assignee)
        } else {
            format!("{criticality} task stale for {} min at {percent}% progress", age_ms / MINUTE_MS)
        };
        out.push(SlaAssessment { task_id: task.id, recommendation, age_ms, reason });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        critical_none = {Criticality::Critical, 4, SlaRecommendation::None},
        critical_ping = {Criticality::Critical, 5, SlaRecommendation::Ping},
        critical_reassign = {Criticality::Critical, 15, SlaRecommendation::Reassign},
        critical_escalate = {Criticality::Critical, 30, SlaRecommendation::Escalate},
        high_none = {Criticality::High, 14, SlaRecommendation::None},
        high_ping = {Criticality::High, 15, SlaRecommendation::Ping},
        high_reassign = {Criticality::High, 60, SlaRecommendation::Reassign},
        high_escalate = {Criticality::High, 120, SlaRecommendation::Escalate},
        low_none = {Criticality::Low, 239, SlaRecommendation::None},
        low_ping = {Criticality::Low, 240, SlaRecommendation::Ping},
    )]
    fn threshold_lattice(criticality: Criticality, age_min: u64, expected: SlaRecommendation) {
        assert_eq!(evaluate(age_min * MINUTE_MS, criticality, 50, false), expected);
    }

    #[test]
    fn medium_pings_on_low_progress_past_an_hour() {
        assert_eq!(evaluate(61 * MINUTE_MS, Criticality::Medium, 10, false), SlaRecommendation::Ping);
        assert_eq!(evaluate(61 * MINUTE_MS, Criticality::Medium, 30, false), SlaRecommendation::None);
    }

    #[test]
    fn medium_reassigns_past_four_hours_regardless_of_progress() {
        assert_eq!(evaluate(241 * MINUTE_MS, Criticality::Medium, 90, false), SlaRecommendation::Reassign);
    }

    #[test]
    fn quarantined_assignee_escalates_immediately() {
        assert_eq!(evaluate(0, Criticality::Low, 100, true), SlaRecommendation::Escalate);
    }

    #[test]
    fn ordering_is_monotonic_for_comparisons() {
        assert!(SlaRecommendation::Ping < SlaRecommendation::Reassign);
        assert!(SlaRecommendation::Reassign < SlaRecommendation::Quarantine);
        assert!(SlaRecommendation::Quarantine < SlaRecommendation::Escalate);
    }
}
