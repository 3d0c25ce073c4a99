// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire request types (§4.B, §6).
//!
//! Every request carries `type` (the serde tag) and `requestId`. The
//! router matches exhaustively over this enum so a new request type that
//! forgets a handler fails to compile rather than falling through silently.

use hubd_core::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
    Auth { request_id: String, account: String, token: String },
    Ping { request_id: String },
    SendMessage { request_id: String, to: String, content: String },
    ReadMessages { request_id: String, #[serde(default)] limit: Option<u32>, #[serde(default)] offset: Option<u32> },
    CountUnread { request_id: String },
    ListAccounts { request_id: String },
    HandoffTask {
        request_id: String,
        to: String,
        payload: serde_json::Value,
        #[serde(default)]
        context: Option<Context>,
    },
    HandoffAccept { request_id: String, handoff_id: String },
    UpdateTaskStatus {
        request_id: String,
        task_id: String,
        status: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        workspace: Option<WorkspaceInput>,
    },
    ReportProgress {
        request_id: String,
        task_id: String,
        percent: u8,
        current_step: String,
        #[serde(default)]
        blockers: Option<String>,
        #[serde(default)]
        estimated_remaining_minutes: Option<f64>,
        #[serde(default)]
        artifacts_produced: Vec<String>,
    },
    ArchiveMessages { request_id: String, days: u32 },
    GetTrust { request_id: String, account: String },
    SuggestAssignee {
        request_id: String,
        required_skills: Vec<String>,
        #[serde(default)]
        exclude_accounts: Vec<String>,
    },
    AdaptiveSlaCheck { request_id: String },
    CheckCircuitBreaker { request_id: String, target: String },
    ReinstateAgent { request_id: String, target: String },
    ConfigReload { request_id: String },
    HealthCheck { request_id: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceInput {
    pub path: String,
    pub branch: String,
    pub id: String,
    /// Whether the workspace's `run_commands` all exited zero — consulted
    /// only by the auto-accept candidate path in §4.G. Defaults to `true`
    /// so a caller that omits it (most do; it's only load-bearing when
    /// `verifiability == auto-testable`) doesn't accidentally suppress
    /// auto-acceptance.
    #[serde(default = "default_run_commands_succeeded")]
    pub run_commands_succeeded: bool,
}

fn default_run_commands_succeeded() -> bool {
    true
}

impl Request {
    pub fn request_id(&self) -> &str {
        match self {
            Request::Auth { request_id, .. }
            | Request::Ping { request_id }
            | Request::SendMessage { request_id, .. }
            | Request::ReadMessages { request_id, .. }
            | Request::CountUnread { request_id }
            | Request::ListAccounts { request_id }
            | Request::HandoffTask { request_id, .. }
            | Request::HandoffAccept { request_id, .. }
            | Request::UpdateTaskStatus { request_id, .. }
            | Request::ReportProgress { request_id, .. }
            | Request::ArchiveMessages { request_id, .. }
            | Request::GetTrust { request_id, .. }
            | Request::SuggestAssignee { request_id, .. }
            | Request::AdaptiveSlaCheck { request_id }
            | Request::CheckCircuitBreaker { request_id, .. }
            | Request::ReinstateAgent { request_id, .. }
            | Request::ConfigReload { request_id }
            | Request::HealthCheck { request_id } => request_id,
        }
    }

    /// Pre-auth allowed types per §4.A: `auth` itself, `ping`, `config_reload`.
    pub fn allowed_before_auth(&self) -> bool {
        matches!(self, Request::Auth { .. } | Request::Ping { .. } | Request::ConfigReload { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Request::Auth { .. } => "auth",
            Request::Ping { .. } => "ping",
            Request::SendMessage { .. } => "send_message",
            Request::ReadMessages { .. } => "read_messages",
            Request::CountUnread { .. } => "count_unread",
            Request::ListAccounts { .. } => "list_accounts",
            Request::HandoffTask { .. } => "handoff_task",
            Request::HandoffAccept { .. } => "handoff_accept",
            Request::UpdateTaskStatus { .. } => "update_task_status",
            Request::ReportProgress { .. } => "report_progress",
            Request::ArchiveMessages { .. } => "archive_messages",
            Request::GetTrust { .. } => "get_trust",
            Request::SuggestAssignee { .. } => "suggest_assignee",
            Request::AdaptiveSlaCheck { .. } => "adaptive_sla_check",
            Request::CheckCircuitBreaker { .. } => "check_circuit_breaker",
            Request::ReinstateAgent { .. } => "reinstate_agent",
            Request::ConfigReload { .. } => "config_reload",
            Request::HealthCheck { .. } => "health_check",
        }
    }
}

pub type RawContext = HashMap<String, String>;
