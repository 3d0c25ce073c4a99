//! Connection and framing specs: the auth gate, ping/config_reload
//! before auth, and malformed-line tolerance.

use crate::prelude::*;
use hubd_wire::Response;

#[test]
fn ping_is_allowed_before_auth() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut client = hub.connect();
    let resp = client.ping();
    assert!(matches!(resp, Response::Pong { .. }));
}

#[test]
fn config_reload_is_allowed_before_auth() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut client = hub.connect();
    let resp = client.config_reload();
    assert!(matches!(resp, Response::Result { .. }), "expected a result, got {resp:?}");
}

#[test]
fn requests_other_than_auth_ping_config_reload_are_rejected_before_auth() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut client = hub.connect();
    let resp = client.count_unread();
    match resp {
        Response::Error { code, .. } => assert_eq!(code.as_deref(), Some("unauthorized")),
        other => panic!("expected unauthorized error, got {other:?}"),
    }
}

#[test]
fn auth_with_wrong_token_fails() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut client = hub.connect();
    let resp = client.auth("alice", "not-the-token");
    assert!(matches!(resp, Response::AuthFail { .. }), "expected auth failure, got {resp:?}");
}

#[test]
fn auth_for_unknown_account_fails() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut client = hub.connect();
    let resp = client.auth("mallory", "anything");
    assert!(matches!(resp, Response::AuthFail { .. }));
}

#[test]
fn auth_succeeds_with_matching_token_and_unlocks_requests() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut client = hub.client_as("alice");
    let resp = client.count_unread();
    assert!(matches!(resp, Response::Result { .. }), "expected a result after auth, got {resp:?}");
}

#[test]
fn health_check_reports_uptime_and_connected_accounts() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut client = hub.client_as("alice");
    let resp = client.health_check();
    let data = response_data(&resp);
    assert!(data["uptime"].is_number());
    assert_eq!(data["connectedAccounts"], serde_json::json!(["alice"]));
}

/// A second connection authenticating as the same account supersedes the
/// first: the first connection's requests start failing once the cancel
/// token fires, since the daemon closes it.
#[test]
fn reconnect_supersedes_the_previous_connection_for_the_same_account() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut first = hub.client_as("alice");
    let mut second = hub.client_as("alice");

    // The new connection is current and fully functional.
    assert!(matches!(second.ping(), Response::Pong { .. }));

    // The superseded connection is eventually closed by the daemon; further
    // requests on it stop getting responses once that happens.
    let closed = wait_for(WAIT_MAX_MS, || {
        first.try_send(hubd_wire::Request::Ping { request_id: "probe".to_string() }).is_none()
    });
    assert!(closed, "superseded connection should eventually be closed");
}
