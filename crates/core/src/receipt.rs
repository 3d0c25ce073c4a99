// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signed verification receipts issued on task accept/reject (§3, §4.G).

use crate::task::TaskId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
}

crate::simple_display! {
    Verdict {
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

/// A signed record binding a task's final verdict to the exact handoff
/// payload that was verified.
///
/// `spec_hash` is a stable content hash of the handoff payload bound to
/// `task_id` — never a sibling handoff to the same recipient (§4.C,
/// testable property §8.5). `signature` is HMAC-SHA256 over
/// `(task_id, spec_hash, verdict, issued_at_ms)` using a per-daemon secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReceipt {
    pub task_id: TaskId,
    pub verifier: String,
    pub verdict: Verdict,
    pub spec_hash: String,
    pub signature: String,
    pub issued_at_ms: u64,
    pub passed: bool,
}
