//! Daemon process lifecycle: socket creation, PID locking, graceful
//! shutdown, and crash-tolerant restart.

use crate::prelude::*;
use std::os::unix::net::UnixStream;

#[test]
#[serial_test::serial]
fn daemon_creates_its_socket_and_pid_files_on_startup() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();
    assert!(hub.socket_path().exists());
    assert!(hub.base_dir().join("daemon.pid").exists());
}

#[test]
#[serial_test::serial]
fn daemon_shuts_down_cleanly_on_sigterm_and_removes_its_socket() {
    let mut hub = Hub::builder().account("alice", "secret-a").spawn();
    hub.shutdown();
    let gone = wait_for(WAIT_MAX_MS, || !hub.socket_path().exists());
    assert!(gone, "socket should be removed after a clean shutdown");
}

#[test]
#[serial_test::serial]
fn a_second_daemon_cannot_start_against_the_same_state_dir_while_one_is_running() {
    let hub = Hub::builder().account("alice", "secret-a").spawn();

    let output = std::process::Command::new(hubd_binary())
        .env("AGENTCTL_DIR", hub.base_dir())
        .output()
        .expect("second hubd invocation should run");
    assert!(!output.status.success(), "a second daemon against a locked state dir should fail to start");
}

/// After an unclean shutdown (no SIGTERM, socket left behind), a fresh
/// daemon start removes the stale socket and binds a working one.
#[test]
#[serial_test::serial]
fn daemon_recovers_from_a_stale_socket_left_by_a_crash() {
    let mut hub = Hub::builder().account("alice", "secret-a").spawn();
    hub.kill();

    // `kill` already waited on the child, so the kernel has released the
    // flock; the state directory (including the stale socket file left
    // behind) is kept alive across the restart.
    let base_dir_handle = hub.into_base_dir();
    let base_dir = base_dir_handle.path().to_path_buf();

    let mut restarted_child = Some(
        std::process::Command::new(hubd_binary())
            .env("AGENTCTL_DIR", &base_dir)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .expect("restart should spawn"),
    );

    let up = wait_for(WAIT_MAX_MS, || UnixStream::connect(base_dir.join("hub.sock")).is_ok());
    assert!(up, "daemon should restart cleanly after a crash");

    if let Some(mut child) = restarted_child.take() {
        let _ = child.kill();
        let _ = child.wait();
    }
}
