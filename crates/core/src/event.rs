// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event bus's tagged union of delegation lifecycle events (§3, §4.E).

use crate::receipt::VerificationReceipt;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

/// Events emitted onto the in-memory event bus as a task moves through its
/// lifecycle, plus connection/account-level notices. Subscribers register
/// by exact `name()` or the wildcard `"*"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DelegationEvent {
    #[serde(rename = "TASK_CREATED")]
    TaskCreated { task_id: TaskId, delegator: String, delegatee: String, timestamp_ms: u64 },
    #[serde(rename = "TASK_ASSIGNED")]
    TaskAssigned { task_id: TaskId, assignee: String, timestamp_ms: u64 },
    #[serde(rename = "TASK_STARTED")]
    TaskStarted { task_id: TaskId, timestamp_ms: u64 },
    #[serde(rename = "PROGRESS_UPDATE")]
    ProgressUpdate { task_id: TaskId, percent: u8, timestamp_ms: u64 },
    #[serde(rename = "CHECKPOINT_REACHED")]
    CheckpointReached { task_id: TaskId, timestamp_ms: u64 },
    #[serde(rename = "TASK_COMPLETED")]
    TaskCompleted { task_id: TaskId, accepted: bool, timestamp_ms: u64 },
    #[serde(rename = "TASK_VERIFIED")]
    TaskVerified { task_id: TaskId, receipt: VerificationReceipt, timestamp_ms: u64 },
    #[serde(rename = "ACCOUNT_SUPERSEDED")]
    AccountSuperseded { account: String, timestamp_ms: u64 },
}

impl DelegationEvent {
    /// The exact-match subscription key, also usable as a human log label.
    pub fn name(&self) -> &'static str {
        match self {
            DelegationEvent::TaskCreated { .. } => "TASK_CREATED",
            DelegationEvent::TaskAssigned { .. } => "TASK_ASSIGNED",
            DelegationEvent::TaskStarted { .. } => "TASK_STARTED",
            DelegationEvent::ProgressUpdate { .. } => "PROGRESS_UPDATE",
            DelegationEvent::CheckpointReached { .. } => "CHECKPOINT_REACHED",
            DelegationEvent::TaskCompleted { .. } => "TASK_COMPLETED",
            DelegationEvent::TaskVerified { .. } => "TASK_VERIFIED",
            DelegationEvent::AccountSuperseded { .. } => "ACCOUNT_SUPERSEDED",
        }
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            DelegationEvent::TaskCreated { task_id, .. }
            | DelegationEvent::TaskAssigned { task_id, .. }
            | DelegationEvent::TaskStarted { task_id, .. }
            | DelegationEvent::ProgressUpdate { task_id, .. }
            | DelegationEvent::CheckpointReached { task_id, .. }
            | DelegationEvent::TaskCompleted { task_id, .. }
            | DelegationEvent::TaskVerified { task_id, .. } => Some(task_id),
            DelegationEvent::AccountSuperseded { .. } => None,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        match self {
            DelegationEvent::TaskCreated { timestamp_ms, .. }
            | DelegationEvent::TaskAssigned { timestamp_ms, .. }
            | DelegationEvent::TaskStarted { timestamp_ms, .. }
            | DelegationEvent::ProgressUpdate { timestamp_ms, .. }
            | DelegationEvent::CheckpointReached { timestamp_ms, .. }
            | DelegationEvent::TaskCompleted { timestamp_ms, .. }
            | DelegationEvent::TaskVerified { timestamp_ms, .. }
            | DelegationEvent::AccountSuperseded { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}
