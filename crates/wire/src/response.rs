// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire response types (§4.B, §6).
//!
//! Standard reply types: `result`, `error`, `auth_ok`, `auth_fail`, `pong`.
//! Every reply carries `requestId` correlating it to the request that
//! produced it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Response {
    AuthOk { request_id: String },
    AuthFail { request_id: String, error: String },
    Pong { request_id: String },
    Result { request_id: String, data: serde_json::Value },
    Error { request_id: String, error: String, #[serde(default, skip_serializing_if = "Option::is_none")] code: Option<String> },
}

impl Response {
    pub fn request_id(&self) -> &str {
        match self {
            Response::AuthOk { request_id }
            | Response::AuthFail { request_id, .. }
            | Response::Pong { request_id }
            | Response::Result { request_id, .. }
            | Response::Error { request_id, .. } => request_id,
        }
    }

    pub fn result(request_id: impl Into<String>, data: serde_json::Value) -> Self {
        Response::Result { request_id: request_id.into(), data }
    }

    pub fn error(request_id: impl Into<String>, error: impl Into<String>, code: impl Into<String>) -> Self {
        Response::Error { request_id: request_id.into(), error: error.into(), code: Some(code.into()) }
    }
}
