// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbox messages: plain chat messages and handoff envelopes (§3).

use crate::handoff::{Context, HandoffPayload};
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a message in a recipient's inbox.
    pub struct MessageId("msg-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    Handoff,
}

crate::simple_display! {
    MessageKind {
        Message => "message",
        Handoff => "handoff",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: String,
    pub to: String,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp_ms: u64,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<HandoffPayload>,
    /// Set when `kind == Handoff`; the task created for this handoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
}

impl Message {
    pub fn new_chat(from: impl Into<String>, to: impl Into<String>, content: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: MessageId::new(),
            from: from.into(),
            to: to.into(),
            kind: MessageKind::Message,
            content: content.into(),
            timestamp_ms: now_ms,
            read: false,
            context: None,
            payload: None,
            task_id: None,
        }
    }

    pub fn new_handoff(
        from: impl Into<String>,
        to: impl Into<String>,
        payload: HandoffPayload,
        task_id: TaskId,
        context: Option<Context>,
        now_ms: u64,
    ) -> Self {
        Self {
            id: MessageId::from_string(task_id.as_str()),
            from: from.into(),
            to: to.into(),
            kind: MessageKind::Handoff,
            content: payload.goal.clone(),
            timestamp_ms: now_ms,
            read: false,
            context,
            payload: Some(payload),
            task_id: Some(task_id),
        }
    }
}
