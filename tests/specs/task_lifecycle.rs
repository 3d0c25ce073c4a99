//! The handoff/task FSM, delegation-depth enforcement, and the
//! auto-acceptance gate (§4.C, §4.G, §8).

use crate::prelude::*;
use hubd_wire::{Response, WorkspaceInput};

fn task_id_of(resp: &Response) -> String {
    response_data(resp)["taskId"].as_str().expect("taskId string").to_string()
}

#[test]
fn handoff_lifecycle_goes_from_todo_to_accepted_with_a_receipt() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    let created = alice.handoff_task("bob", minimal_payload("Ship the thing"));
    let data = response_data(&created);
    assert_eq!(data["delivered"], true);
    let task_id = task_id_of(&created);

    let accepted_handoff = bob.handoff_accept(&task_id);
    assert!(matches!(accepted_handoff, Response::Result { .. }));

    let started = bob.update_task_status(&task_id, "in_progress", None);
    assert_eq!(response_data(&started)["status"], "in_progress");

    let workspace = WorkspaceInput {
        path: "/workspaces/ship".to_string(),
        branch: "ship-the-thing".to_string(),
        id: "ws-1".to_string(),
        run_commands_succeeded: true,
    };
    let ready = bob.update_task_status_with_workspace(&task_id, "ready_for_review", workspace);
    let ready_data = response_data(&ready);
    assert_eq!(ready_data["status"], "ready_for_review");
    // No criticality/reversibility/verifiability given -> medium/reversible/
    // needs-review defaults, which land on require-acceptance.
    assert_eq!(ready_data["acceptance"], "pending");

    let accepted = bob.update_task_status(&task_id, "accepted", None);
    assert_eq!(response_data(&accepted)["status"], "accepted");
}

#[test]
fn an_illegal_transition_is_rejected() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let created = alice.handoff_task("bob", minimal_payload("skip steps"));
    let task_id = task_id_of(&created);

    let resp = alice.update_task_status(&task_id, "accepted", None);
    match resp {
        Response::Error { code, .. } => assert_eq!(code.as_deref(), Some("invalid-state-transition")),
        other => panic!("expected invalid-state-transition, got {other:?}"),
    }
}

#[test]
fn rejecting_a_task_requires_a_non_empty_reason() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");
    let created = alice.handoff_task("bob", minimal_payload("needs review"));
    let task_id = task_id_of(&created);
    bob.update_task_status(&task_id, "in_progress", None);

    let workspace =
        WorkspaceInput { path: "/ws".to_string(), branch: "b".to_string(), id: "w".to_string(), run_commands_succeeded: true };
    bob.update_task_status_with_workspace(&task_id, "ready_for_review", workspace);

    let resp = bob.update_task_status(&task_id, "rejected", None);
    match resp {
        Response::Error { code, .. } => assert_eq!(code.as_deref(), Some("validation")),
        other => panic!("expected validation error for missing reason, got {other:?}"),
    }

    let resp = bob.update_task_status(&task_id, "rejected", Some("doesn't meet acceptance criteria"));
    assert_eq!(response_data(&resp)["status"], "rejected");
}

#[test]
fn delegation_depth_beyond_the_configured_max_is_rejected() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").max_depth(2).spawn();
    let mut alice = hub.client_as("alice");

    let mut too_deep = minimal_payload("too deep");
    too_deep["delegation_depth"] = serde_json::json!(3);
    let resp = alice.handoff_task("bob", too_deep);
    match resp {
        Response::Error { code, .. } => assert_eq!(code.as_deref(), Some("depth-exceeded")),
        other => panic!("expected depth-exceeded, got {other:?}"),
    }

    let mut shallow_enough = minimal_payload("shallow enough");
    shallow_enough["delegation_depth"] = serde_json::json!(1);
    let resp = alice.handoff_task("bob", shallow_enough);
    assert!(matches!(resp, Response::Result { .. }));
}

#[test]
fn low_criticality_auto_testable_with_passing_commands_auto_accepts() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    let mut payload = minimal_payload("small fix");
    payload["criticality"] = serde_json::json!("low");
    payload["reversibility"] = serde_json::json!("reversible");
    payload["verifiability"] = serde_json::json!("auto-testable");
    let created = alice.handoff_task("bob", payload);
    let task_id = task_id_of(&created);

    bob.update_task_status(&task_id, "in_progress", None);
    let workspace =
        WorkspaceInput { path: "/ws".to_string(), branch: "fix".to_string(), id: "w".to_string(), run_commands_succeeded: true };
    let resp = bob.update_task_status_with_workspace(&task_id, "ready_for_review", workspace);
    let data = response_data(&resp);
    assert_eq!(data["acceptance"], "auto");
    assert_eq!(data["status"], "accepted");
}

/// High criticality combined with an irreversible change trips the
/// blocking cognitive-friction rule before the gated-action classifier
/// ever runs, so this never reaches "accepted" on its own.
#[test]
fn high_criticality_irreversible_change_is_blocked_by_cognitive_friction() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    let mut payload = minimal_payload("drop the production table");
    payload["criticality"] = serde_json::json!("high");
    payload["reversibility"] = serde_json::json!("irreversible");
    let created = alice.handoff_task("bob", payload);
    let task_id = task_id_of(&created);

    bob.update_task_status(&task_id, "in_progress", None);
    let workspace =
        WorkspaceInput { path: "/ws".to_string(), branch: "drop".to_string(), id: "w".to_string(), run_commands_succeeded: true };
    let resp = bob.update_task_status_with_workspace(&task_id, "ready_for_review", workspace);
    let data = response_data(&resp);
    assert_eq!(data["acceptance"], "blocked");
    assert_eq!(data["status"], "ready_for_review");
}

/// Matches the §8 seed scenario literally: a `criticality="critical"` task
/// stays in `ready_for_review` and the reply's `acceptance` field is
/// `"blocked"`, the same value used for the blocking-friction path — both
/// mean "did not auto-accept, a human must act".
#[test]
fn critical_task_requires_elevated_review() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    let mut payload = minimal_payload("rotate the root signing key");
    payload["criticality"] = serde_json::json!("critical");
    let created = alice.handoff_task("bob", payload);
    let task_id = task_id_of(&created);

    bob.update_task_status(&task_id, "in_progress", None);
    let workspace =
        WorkspaceInput { path: "/ws".to_string(), branch: "rotate".to_string(), id: "w".to_string(), run_commands_succeeded: true };
    let resp = bob.update_task_status_with_workspace(&task_id, "ready_for_review", workspace);
    let data = response_data(&resp);
    assert_eq!(data["acceptance"], "blocked");
    assert_eq!(data["status"], "ready_for_review");
}

#[test]
fn progress_reports_are_visible_to_the_adaptive_sla_scan() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    let created = alice.handoff_task("bob", minimal_payload("long running task"));
    let task_id = task_id_of(&created);
    bob.update_task_status(&task_id, "in_progress", None);
    bob.report_progress(&task_id, 40, "halfway there");

    let resp = bob.adaptive_sla_check();
    let data = response_data(&resp);
    assert!(data["recommendations"].is_array());
}
