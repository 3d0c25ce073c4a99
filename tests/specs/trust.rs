//! Reputation and assignee suggestion (§4.H): a fresh account starts at
//! a neutral trust score, and accepting a task nudges it upward.

use crate::prelude::*;
use hubd_wire::WorkspaceInput;

#[test]
fn a_fresh_account_has_a_neutral_trust_score() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut alice = hub.client_as("alice");

    let data = response_data(&alice.get_trust("alice"));
    assert_eq!(data["trust_score"], 50.0);
}

#[test]
fn accepting_a_task_raises_the_assignees_trust_score() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    let before = response_data(&bob.get_trust("bob"))["trust_score"].as_f64().expect("trust score");

    let created = alice.handoff_task("bob", minimal_payload("quick task"));
    let task_id = response_data(&created)["taskId"].as_str().unwrap().to_string();
    bob.update_task_status(&task_id, "in_progress", None);
    let workspace =
        WorkspaceInput { path: "/ws".to_string(), branch: "b".to_string(), id: "w".to_string(), run_commands_succeeded: true };
    bob.update_task_status_with_workspace(&task_id, "ready_for_review", workspace);
    bob.update_task_status(&task_id, "accepted", None);

    let after = response_data(&bob.get_trust("bob"))["trust_score"].as_f64().expect("trust score");
    assert!(after > before, "trust score should rise after an accepted task: {before} -> {after}");
}

#[test]
fn suggest_assignee_excludes_requested_accounts() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");

    let data = response_data(&alice.suggest_assignee(vec![], vec!["bob".to_string()]));
    let candidates = data["candidates"].as_array().expect("candidates array");
    assert!(candidates.iter().all(|c| c["account"] != "bob"));
}
