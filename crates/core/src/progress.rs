// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress reports used by the SLA engine (§3, §4.F).

use crate::task::TaskId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub task_id: TaskId,
    pub agent: String,
    pub percent: u8,
    pub current_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_remaining_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts_produced: Vec<String>,
    pub reported_at_ms: u64,
}

impl ProgressReport {
    /// Clamp percent to the documented [0, 100] range rather than trusting
    /// the caller, since the wire layer deserializes an arbitrary `u8`.
    pub fn clamped_percent(&self) -> u8 {
        self.percent.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_percent_above_100() {
        let report = ProgressReport {
            task_id: TaskId::new(),
            agent: "a".into(),
            percent: 250,
            current_step: "step".into(),
            blockers: None,
            estimated_remaining_minutes: None,
            artifacts_produced: vec![],
            reported_at_ms: 0,
        };
        assert_eq!(report.clamped_percent(), 100);
    }
}
