//! The auto-launcher's circuit breaker surface (§4.I): these two request
//! types only read and reset accumulated breaker state; nothing in this
//! daemon's wire surface records a spawn failure directly, so the breaker
//! starts closed and reinstating an untouched target is a no-op success.

use crate::prelude::*;

#[test]
fn an_untouched_targets_circuit_breaker_starts_closed() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut alice = hub.client_as("alice");

    let resp = alice.check_circuit_breaker("bob");
    let data = response_data(&resp);
    assert_eq!(data["open"], false);
    assert_eq!(data["failures"], 0);
}

#[test]
fn reinstating_an_untouched_target_succeeds() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    let mut alice = hub.client_as("alice");

    let resp = alice.reinstate_agent("bob");
    assert_eq!(response_data(&resp)["reinstated"], true);
}
