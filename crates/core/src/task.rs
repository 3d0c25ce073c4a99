// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task state machine (§3, §4.C).

use crate::handoff::HandoffPayload;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies both a task and the handoff that created it.
    ///
    /// A handoff produces exactly one task at creation time, so `taskId`
    /// and `handoffId` are the same value — resolving the Open Question in
    /// §9 about the two being used interchangeably in the source.
    pub struct TaskId("tsk-");
}

/// Alias used at call sites that conceptually refer to "the handoff id"
/// rather than "the task id" — same underlying type, per [`TaskId`]'s doc.
pub type HandoffId = TaskId;

/// The task lifecycle. The only legal transitions are
/// `Todo -> InProgress -> ReadyForReview -> {Accepted, Rejected}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    ReadyForReview,
    Accepted,
    Rejected,
}

crate::simple_display! {
    TaskStatus {
        Todo => "todo",
        InProgress => "in_progress",
        ReadyForReview => "ready_for_review",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

impl TaskStatus {
    /// Whether `self -> next` is a legal FSM transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Todo, InProgress)
                | (InProgress, ReadyForReview)
                | (ReadyForReview, Accepted)
                | (ReadyForReview, Rejected)
        )
    }

    /// `Accepted` is the only terminal state that cannot be left; `Rejected`
    /// is also terminal (no transition leads out of it either).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Accepted | TaskStatus::Rejected)
    }
}

/// Append-only lifecycle event recorded on a task (mirrors [`crate::event::DelegationEvent`]
/// but scoped to the task's own history for `events` in §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub kind: String,
    pub at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TaskEvent {
    pub fn new(kind: impl Into<String>, at_ms: u64) -> Self {
        Self { kind: kind.into(), at_ms, detail: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Workspace binding recorded once a task has a git-worktree-backed workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWorkspace {
    pub path: String,
    pub branch: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub assignee: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default)]
    pub events: Vec<TaskEvent>,
    pub payload: HandoffPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<TaskWorkspace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

impl Task {
    pub fn new(id: TaskId, title: String, assignee: String, payload: HandoffPayload, now_ms: u64) -> Self {
        Self {
            id,
            title,
            status: TaskStatus::Todo,
            assignee,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            events: vec![TaskEvent::new("TASK_CREATED", now_ms)],
            payload,
            workspace: None,
            reject_reason: None,
        }
    }

    /// Applies a status transition, appending the matching lifecycle event.
    ///
    /// `reason` is required when transitioning to `Rejected` — enforced by
    /// the caller (the engine), which holds the `HubError` type this crate
    /// does not depend on.
    pub fn apply_transition(&mut self, next: TaskStatus, now_ms: u64, reason: Option<String>) {
        self.status = next;
        self.updated_at_ms = now_ms;
        if next == TaskStatus::Rejected {
            self.reject_reason = reason;
        }
        let kind = match next {
            TaskStatus::InProgress => "TASK_STARTED",
            TaskStatus::ReadyForReview => "CHECKPOINT_REACHED",
            TaskStatus::Accepted | TaskStatus::Rejected => "TASK_COMPLETED",
            TaskStatus::Todo => "TASK_CREATED",
        };
        self.events.push(TaskEvent::new(kind, now_ms));
    }
}
