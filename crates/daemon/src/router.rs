// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch (§4.B).
//!
//! One exhaustive `match` over [`hubd_wire::Request`] — a new request
//! variant with no arm added here fails to compile rather than falling
//! through silently at runtime. Every arm resolves to a `HubResult<Value>`
//! that this module turns into the wire `result`/`error` reply shape.

use hubd_core::{Clock, HubError, HubResult};
use hubd_wire::{Request, Response};
use serde_json::Value;

use crate::handlers;
use crate::listener::Session;
use crate::state::DaemonState;

/// Dispatches one already-framed request. `session` carries the
/// connection's auth state; requests other than `auth`/`ping`/
/// `config_reload` are rejected with `unauthorized` unless the session
/// has already authenticated, per §4.A.
pub fn dispatch<C: Clock>(state: &DaemonState<C>, session: &mut Session, request: Request) -> Response {
    let request_id = request.request_id().to_string();
    let is_auth = matches!(request, Request::Auth { .. });
    let is_ping = matches!(request, Request::Ping { .. });

    if !request.allowed_before_auth() && session.account.is_none() {
        return Response::error(request_id, "connection has not authenticated", "unauthorized");
    }

    match route(state, session, request) {
        Ok(_) if is_ping => Response::Pong { request_id },
        Ok(_) if is_auth => Response::AuthOk { request_id },
        Ok(value) => Response::result(request_id, value),
        Err(err) if is_auth => Response::AuthFail { request_id, error: err.message },
        Err(err) => Response::error(request_id, err.message.clone(), err.code()),
    }
}

fn route<C: Clock>(state: &DaemonState<C>, session: &mut Session, request: Request) -> HubResult<Value> {
    match request {
        Request::Auth { account, token, .. } => handlers::misc::auth(state, session, &account, &token),
        Request::Ping { .. } => handlers::misc::ping(),
        Request::ConfigReload { .. } => handlers::misc::config_reload(state),
        Request::HealthCheck { .. } => handlers::misc::health_check(state),

        Request::SendMessage { to, content, .. } => {
            handlers::messages::send_message(state, account_of(session)?, &to, &content)
        }
        Request::ReadMessages { limit, offset, .. } => {
            handlers::messages::read_messages(state, account_of(session)?, limit, offset)
        }
        Request::CountUnread { .. } => handlers::messages::count_unread(state, account_of(session)?),
        Request::ListAccounts { .. } => handlers::messages::list_accounts(state),
        Request::ArchiveMessages { days, .. } => handlers::messages::archive_messages(state, days),

        Request::HandoffTask { to, payload, context, .. } => {
            handlers::handoff::handoff_task(state, account_of(session)?, &to, payload, context)
        }
        Request::HandoffAccept { handoff_id, .. } => {
            handlers::handoff::handoff_accept(state, account_of(session)?, &handoff_id)
        }
        Request::UpdateTaskStatus { task_id, status, reason, workspace, .. } => {
            handlers::handoff::update_task_status(state, account_of(session)?, &task_id, &status, reason, workspace)
        }
        Request::ReportProgress {
            task_id, percent, current_step, blockers, estimated_remaining_minutes, artifacts_produced, ..
        } => handlers::handoff::report_progress(
            state,
            &task_id,
            percent,
            current_step,
            blockers,
            estimated_remaining_minutes,
            artifacts_produced,
        ),
        Request::AdaptiveSlaCheck { .. } => handlers::handoff::adaptive_sla_check(state),

        Request::GetTrust { account, .. } => handlers::trust::get_trust(state, &account),
        Request::SuggestAssignee { required_skills, exclude_accounts, .. } => {
            handlers::trust::suggest_assignee(state, required_skills, exclude_accounts)
        }

        Request::CheckCircuitBreaker { target, .. } => handlers::launcher::check_circuit_breaker(state, &target),
        Request::ReinstateAgent { target, .. } => handlers::launcher::reinstate_agent(state, &target),
    }
}

fn account_of(session: &Session) -> HubResult<&str> {
    session.account.as_deref().ok_or_else(|| HubError::unauthorized("connection has not authenticated"))
}
