// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The handoff payload contract: the structured task-transfer schema
//! validated by the task & handoff engine (§3, §4.C).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

macro_rules! fixed_enum {
    ($name:ident { $( $variant:ident => $str:literal ),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $( $variant, )+
        }

        crate::simple_display! {
            $name { $( $variant => $str, )+ }
        }
    };
}

fixed_enum!(Complexity { Low => "low", Medium => "medium", High => "high", Critical => "critical" });
fixed_enum!(Criticality { Low => "low", Medium => "medium", High => "high", Critical => "critical" });
fixed_enum!(Reversibility { Reversible => "reversible", Partial => "partial", Irreversible => "irreversible" });
fixed_enum!(Verifiability { AutoTestable => "auto-testable", NeedsReview => "needs-review", Subjective => "subjective" });
fixed_enum!(Uncertainty { Low => "low", Medium => "medium", High => "high" });
fixed_enum!(AutonomyLevel { Strict => "strict", Standard => "standard", OpenEnded => "open-ended" });
fixed_enum!(MonitoringLevel { OutcomeOnly => "outcome-only", Periodic => "periodic", Continuous => "continuous" });

/// The structured task-transfer contract carried by a `handoff_task` request.
///
/// Required fields per §3: `goal`, `acceptance_criteria`, `run_commands`,
/// `blocked_by` (use the literal `"none"` when there are no blockers).
/// Everything else is optional enrichment consumed by the SLA engine, the
/// auto-acceptance gate, and the assignee-suggestion heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffPayload {
    pub goal: String,
    pub acceptance_criteria: Vec<String>,
    pub run_commands: Vec<String>,
    pub blocked_by: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<Criticality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversibility: Option<Reversibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifiability: Option<Verifiability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<Uncertainty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomy_level: Option<AutonomyLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_level: Option<MonitoringLevel>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_minutes: Option<f64>,
    #[serde(default)]
    pub delegation_depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_handoff_id: Option<String>,
}

impl HandoffPayload {
    /// Canonical, field-ordered bytes for hashing (specHash) — deliberately
    /// not `serde_json::to_vec` over a generic map, so hash stability never
    /// depends on a serializer's key-ordering behavior.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(self.goal.as_bytes());
        buf.push(0);
        for c in &self.acceptance_criteria {
            buf.extend_from_slice(c.as_bytes());
            buf.push(0);
        }
        buf.push(0);
        for c in &self.run_commands {
            buf.extend_from_slice(c.as_bytes());
            buf.push(0);
        }
        buf.push(0);
        for c in &self.blocked_by {
            buf.extend_from_slice(c.as_bytes());
            buf.push(0);
        }
        buf.push(0);
        buf.extend_from_slice(self.complexity.map(|c| c.to_string()).unwrap_or_default().as_bytes());
        buf.push(0);
        buf.extend_from_slice(self.criticality.map(|c| c.to_string()).unwrap_or_default().as_bytes());
        buf.push(0);
        buf.extend_from_slice(self.reversibility.map(|c| c.to_string()).unwrap_or_default().as_bytes());
        buf.push(0);
        buf.extend_from_slice(self.verifiability.map(|c| c.to_string()).unwrap_or_default().as_bytes());
        buf.push(0);
        buf.extend_from_slice(&self.delegation_depth.to_le_bytes());
        buf
    }
}

/// Free-form per-message context, e.g. file paths the recipient should read.
pub type Context = HashMap<String, String>;
