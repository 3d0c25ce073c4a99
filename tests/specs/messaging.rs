//! Chat-message specs (§4.D, §8): send & read, and the testable property
//! that `count_unread` is `0` right after `read_messages`.

use crate::prelude::*;

#[test]
fn send_then_read_delivers_the_message_and_counts_it() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    alice.send_message("bob", "hello bob");

    let unread = response_data(&bob.count_unread());
    assert_eq!(unread["count"], 1);

    let read = response_data(&bob.read_messages());
    let messages = read["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hello bob");
}

#[test]
fn read_messages_marks_everything_read_so_count_unread_drops_to_zero() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut bob = hub.client_as("bob");

    alice.send_message("bob", "one");
    alice.send_message("bob", "two");
    alice.send_message("bob", "three");

    bob.read_messages();
    let unread = response_data(&bob.count_unread());
    assert_eq!(unread["count"], 0);
}

#[test]
fn list_accounts_reports_connection_state() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");

    let data = response_data(&alice.list_accounts());
    let accounts = data["accounts"].as_array().expect("accounts array");
    let bob_entry = accounts.iter().find(|a| a["name"] == "bob").expect("bob listed");
    assert_eq!(bob_entry["connected"], false);

    let mut _bob = hub.client_as("bob");
    let data = response_data(&alice.list_accounts());
    let accounts = data["accounts"].as_array().expect("accounts array");
    let bob_entry = accounts.iter().find(|a| a["name"] == "bob").expect("bob listed");
    assert_eq!(bob_entry["connected"], true);
}

#[test]
fn archive_messages_with_a_zero_day_cutoff_archives_everything_sent_so_far() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    alice.send_message("bob", "archive me");

    let resp = alice.archive_messages(0);
    let data = response_data(&resp);
    assert!(data["archived"].as_u64().unwrap_or(0) >= 1);
}

#[test]
fn a_message_to_an_offline_account_is_queued_not_delivered() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");

    let resp = alice.send_message("bob", "are you there?");
    let data = response_data(&resp);
    assert_eq!(data["delivered"], false);
    assert_eq!(data["queued"], true);
}

#[test]
fn a_message_to_a_connected_account_is_marked_delivered() {
    let hub = Hub::builder().account("alice", "secret-a").account("bob", "secret-b").spawn();
    let mut alice = hub.client_as("alice");
    let mut _bob = hub.client_as("bob");

    let resp = alice.send_message("bob", "hi!");
    let data = response_data(&resp);
    assert_eq!(data["delivered"], true);
}
