// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task/handoff engine's request handlers (§4.C, §4.F, §4.G):
//! `handoff_task`, `handoff_accept`, `update_task_status`,
//! `report_progress`, `adaptive_sla_check`.
//!
//! Every write here is made under [`DaemonState::task_lock`] so a status
//! update racing a progress report never tears a task's journal entry.

use hubd_core::{
    Clock, Complexity, Context, Criticality, DelegationEvent, HubError, HubResult, Message, ProgressReport,
    Reversibility, Task, TaskId, TaskStatus, TaskWorkspace, Verdict, Verifiability,
};
use hubd_engine::{Friction, GatedAction};
use hubd_storage::{MessageStore, ReputationStore};
use hubd_wire::WorkspaceInput;
use serde_json::{json, Value};

use crate::state::DaemonState;

/// Creates a task from an incoming handoff (§4.C): sanitize, validate,
/// enforce delegation depth, then persist the task and deliver the chat
/// message in one critical section. `TASK_CREATED` is published, and the
/// journal write and inbox append both complete, before this returns (§5).
pub fn handoff_task<C: Clock>(
    state: &DaemonState<C>,
    from: &str,
    to: &str,
    payload: Value,
    context: Option<Context>,
) -> HubResult<Value> {
    let payload: hubd_core::HandoffPayload = serde_json::from_value(payload)?;
    let (payload, warnings) = hubd_engine::sanitize(payload, context.as_ref())?;
    hubd_engine::validate(&payload)?;
    hubd_engine::depth::enforce(payload.delegation_depth, state.max_depth())?;

    let now = state.clock.epoch_ms();
    let task_id = TaskId::new();
    let task = Task::new(task_id, payload.goal.clone(), to.to_string(), payload.clone(), now);
    let message = Message::new_handoff(from, to, payload, task_id, context, now);

    let guard = state.task_lock.lock();
    state.journal.create(&task)?;
    {
        let db = state.db.lock();
        MessageStore::new(&db).append(&message)?;
    }
    drop(guard);

    let delivered = state.connections.lock().contains_key(to);
    state.event_bus.publish(DelegationEvent::TaskCreated {
        task_id,
        delegator: from.to_string(),
        delegatee: to.to_string(),
        timestamp_ms: now,
    });

    let mut result = json!({
        "handoffId": task_id.to_string(),
        "taskId": task_id.to_string(),
        "delivered": delivered,
        "queued": !delivered,
    });
    if !warnings.0.is_empty() {
        result["sanitization"] = json!(warnings.0);
    }
    Ok(result)
}

/// Acknowledges receipt of a handoff without changing the task's FSM
/// state — `update_task_status` is what actually moves `todo -> in_progress`.
/// Publishes `TASK_ASSIGNED`, which precedes `TASK_STARTED` in the event
/// sequence whenever a recipient calls this before starting work.
pub fn handoff_accept<C: Clock>(state: &DaemonState<C>, account: &str, handoff_id: &str) -> HubResult<Value> {
    let task_id = TaskId::from_string(handoff_id);
    let guard = state.task_lock.lock();
    let task = state
        .journal
        .load(&task_id)?
        .ok_or_else(|| HubError::not_found(format!("no task for handoff {handoff_id}")))?;
    drop(guard);

    if task.assignee != account {
        return Err(HubError::unauthorized("handoff is not addressed to this account"));
    }

    let now = state.clock.epoch_ms();
    state.event_bus.publish(DelegationEvent::TaskAssigned { task_id, assignee: account.to_string(), timestamp_ms: now });
    Ok(json!({"taskId": task_id.to_string(), "status": task.status.to_string()}))
}

/// Drives the task FSM (§4.C). A transition to `ready_for_review` with
/// workspace info runs the auto-acceptance gate; a transition straight to
/// `accepted`/`rejected` issues a verification receipt either way.
pub fn update_task_status<C: Clock>(
    state: &DaemonState<C>,
    _account: &str,
    task_id: &str,
    status: &str,
    reason: Option<String>,
    workspace: Option<WorkspaceInput>,
) -> HubResult<Value> {
    let id = TaskId::from_string(task_id);
    let next: TaskStatus = serde_json::from_value(Value::String(status.to_string()))
        .map_err(|_| HubError::validation(format!("unknown task status '{status}'")))?;

    let guard = state.task_lock.lock();
    let mut task =
        state.journal.load(&id)?.ok_or_else(|| HubError::not_found(format!("unknown task {task_id}")))?;

    if !task.status.can_transition_to(next) {
        return Err(HubError::invalid_state_transition(format!(
            "task {task_id} cannot move from {} to {next}",
            task.status
        )));
    }
    if next == TaskStatus::Rejected && reason.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(HubError::validation("rejecting a task requires a non-empty reason"));
    }

    let now = state.clock.epoch_ms();
    if let Some(ws) = &workspace {
        task.workspace = Some(TaskWorkspace { path: ws.path.clone(), branch: ws.branch.clone(), id: ws.id.clone() });
    }
    task.apply_transition(next, now, reason);
    state.journal.save(&task)?;
    publish_transition_event(state, &task, next, now);

    let acceptance = if next == TaskStatus::ReadyForReview && task.workspace.is_some() {
        Some(classify_and_maybe_auto_accept(state, &mut task, workspace.as_ref(), now)?)
    } else if next == TaskStatus::Accepted || next == TaskStatus::Rejected {
        let verdict = if next == TaskStatus::Accepted { Verdict::Accepted } else { Verdict::Rejected };
        issue_and_record_receipt(state, &task, verdict, now)?;
        None
    } else {
        None
    };
    drop(guard);

    Ok(json!({
        "taskId": task.id.to_string(),
        "status": task.status.to_string(),
        "acceptance": acceptance,
    }))
}

/// Runs the auto-acceptance gate against a task reaching `ready_for_review`
/// with a workspace attached. On `auto-accept` the task is moved straight
/// to `accepted` and a receipt is issued; otherwise it is left for a human
/// to resolve and the classification is surfaced as the `acceptance` field.
fn classify_and_maybe_auto_accept<C: Clock>(
    state: &DaemonState<C>,
    task: &mut Task,
    workspace: Option<&WorkspaceInput>,
    now: u64,
) -> HubResult<String> {
    let criticality = task.payload.criticality.unwrap_or(Criticality::Medium);
    let reversibility = task.payload.reversibility.unwrap_or(Reversibility::Reversible);
    let complexity = task.payload.complexity.unwrap_or(Complexity::Medium);
    let verifiability = task.payload.verifiability.unwrap_or(Verifiability::NeedsReview);
    let run_ok = workspace.map(|w| w.run_commands_succeeded).unwrap_or(true);

    let (friction, action) = hubd_engine::classify(criticality, reversibility, complexity, verifiability, run_ok);
    if friction == Friction::Blocking {
        return Ok("blocked".to_string());
    }

    match action {
        Some(GatedAction::AutoAccept) => {
            task.apply_transition(TaskStatus::Accepted, now, None);
            state.journal.save(task)?;
            publish_transition_event(state, task, TaskStatus::Accepted, now);
            issue_and_record_receipt(state, task, Verdict::Accepted, now)?;
            Ok("auto".to_string())
        }
        Some(GatedAction::RequireJustification) => Ok("justification-required".to_string()),
        // §8's seed scenario names the literal reply value "blocked" for a
        // critical-criticality task that stays in ready_for_review — the
        // same value the blocking-friction path above uses, since from the
        // caller's perspective both mean "did not auto-accept, a human
        // must act". The richer elevated-review/justification distinction
        // is still visible via TASK_VERIFIED's eventual receipt verdict.
        Some(GatedAction::RequireElevatedReview) => Ok("blocked".to_string()),
        Some(GatedAction::RequireAcceptance) | None => Ok("pending".to_string()),
    }
}

/// Issues a verification receipt bound to `task`'s own stored payload
/// (never a sibling handoff's), publishes `TASK_VERIFIED`, and folds the
/// outcome into the assignee's trust score (§4.G, §4.H).
fn issue_and_record_receipt<C: Clock>(state: &DaemonState<C>, task: &Task, verdict: Verdict, now_ms: u64) -> HubResult<()> {
    let receipt = hubd_engine::issue_receipt(&state.hmac_secret, task.id, task.assignee.clone(), verdict, &task.payload, now_ms);
    state.event_bus.publish(DelegationEvent::TaskVerified { task_id: task.id, receipt, timestamp_ms: now_ms });

    let sla_breached = state.was_escalated(&task.id);
    let db = state.db.lock();
    let reputation_store = ReputationStore::new(&db);
    let mut reputation = reputation_store.get_or_fresh(&task.assignee, now_ms)?;
    hubd_engine::update_on_completion(&mut reputation, verdict == Verdict::Accepted, sla_breached, now_ms);
    reputation_store.upsert(&reputation)?;
    Ok(())
}

fn publish_transition_event<C: Clock>(state: &DaemonState<C>, task: &Task, next: TaskStatus, now: u64) {
    let event = match next {
        TaskStatus::InProgress => DelegationEvent::TaskStarted { task_id: task.id, timestamp_ms: now },
        TaskStatus::ReadyForReview => DelegationEvent::CheckpointReached { task_id: task.id, timestamp_ms: now },
        TaskStatus::Accepted | TaskStatus::Rejected => {
            DelegationEvent::TaskCompleted { task_id: task.id, accepted: next == TaskStatus::Accepted, timestamp_ms: now }
        }
        TaskStatus::Todo => return,
    };
    state.event_bus.publish(event);
}

pub fn report_progress<C: Clock>(
    state: &DaemonState<C>,
    task_id: &str,
    percent: u8,
    current_step: String,
    blockers: Option<String>,
    estimated_remaining_minutes: Option<f64>,
    artifacts_produced: Vec<String>,
) -> HubResult<Value> {
    let id = TaskId::from_string(task_id);
    let task = state.journal.load(&id)?.ok_or_else(|| HubError::not_found(format!("unknown task {task_id}")))?;
    let now = state.clock.epoch_ms();

    let report = ProgressReport {
        task_id: id,
        agent: task.assignee,
        percent,
        current_step,
        blockers,
        estimated_remaining_minutes,
        artifacts_produced,
        reported_at_ms: now,
    };
    let clamped = report.clamped_percent();
    state.record_progress(report);
    state.event_bus.publish(DelegationEvent::ProgressUpdate { task_id: id, percent: clamped, timestamp_ms: now });
    Ok(json!({"ok": true}))
}

/// Scans every in-flight task against the SLA lattice (§4.F) and marks any
/// newly `escalate`d task so its eventual `TASK_COMPLETED` trust update
/// knows its SLA was breached.
pub fn adaptive_sla_check<C: Clock>(state: &DaemonState<C>) -> HubResult<Value> {
    let now = state.clock.epoch_ms();
    let tasks = state.journal.list_live()?;
    let assessments = hubd_engine::scan_sla(now, &tasks, |task_id| state.latest_progress_for(task_id), |assignee| {
        state.is_quarantined(assignee)
    });

    for assessment in &assessments {
        if assessment.recommendation == hubd_engine::SlaRecommendation::Escalate {
            state.mark_escalated(assessment.task_id);
        }
    }

    Ok(json!({"recommendations": assessments}))
}
