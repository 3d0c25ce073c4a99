//! Test helpers for behavioral specifications.
//!
//! Drives the real `hubd` binary over its Unix domain socket; no request
//! or response type is reimplemented here, only spawned and dialed.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use hubd_core::Account;
use hubd_wire::{Request, Response};

pub const POLL_INTERVAL_MS: u64 = 20;
pub const WAIT_MAX_MS: u64 = 3_000;

/// Resolves the `hubd` binary the way `assert_cmd` would, but as a raw
/// path so it can be spawned with a controlled environment.
pub fn hubd_binary() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug/hubd");
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("hubd");
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

pub fn wait_for<F: FnMut() -> bool>(timeout_ms: u64, mut condition: F) -> bool {
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
    false
}

/// A configured, running daemon instance bound to its own temp state dir.
/// Dropping it kills the process and removes the directory.
pub struct Hub {
    base_dir: tempfile::TempDir,
    child: Option<Child>,
}

impl Hub {
    /// Builds the on-disk config and token files but does not start the
    /// daemon yet — see [`Hub::spawn`].
    pub fn builder() -> HubBuilder {
        HubBuilder { accounts: Vec::new(), max_depth: None }
    }

    pub fn base_dir(&self) -> &Path {
        self.base_dir.path()
    }

    pub fn socket_path(&self) -> PathBuf {
        self.base_dir().join("hub.sock")
    }

    pub fn token_for(&self, account: &str) -> String {
        std::fs::read_to_string(self.base_dir().join("tokens").join(format!("{account}.token")))
            .expect("token file should exist")
    }

    /// Connects and authenticates as `account`, returning a ready client.
    pub fn client_as(&self, account: &str) -> Client {
        let mut client = self.connect();
        let token = self.token_for(account);
        let resp = client.auth(account, token.trim());
        assert!(matches!(resp, Response::AuthOk { .. }), "auth failed: {resp:?}");
        client
    }

    /// Connects without authenticating.
    pub fn connect(&self) -> Client {
        let deadline = Instant::now() + Duration::from_millis(WAIT_MAX_MS);
        loop {
            match UnixStream::connect(self.socket_path()) {
                Ok(stream) => return Client::new(stream),
                Err(e) if Instant::now() < deadline => {
                    let _ = e;
                    std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
                }
                Err(e) => panic!("could not connect to daemon socket: {e}"),
            }
        }
    }

    /// Sends SIGTERM and waits for a clean exit.
    pub fn shutdown(&mut self) {
        if let Some(child) = &mut self.child {
            let _ = Command::new("kill").args(["-TERM", &child.id().to_string()]).status();
            let _ = child.wait();
        }
        self.child = None;
    }

    /// Sends SIGKILL, simulating a crash.
    pub fn kill(&mut self) {
        if let Some(child) = &mut self.child {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.child = None;
    }

    /// Consumes the handle without removing the state directory, for
    /// tests that need to restart a fresh process against the same files
    /// after the original has already been stopped or killed.
    pub fn into_base_dir(mut self) -> tempfile::TempDir {
        self.child = None;
        std::mem::replace(&mut self.base_dir, tempfile::tempdir().expect("placeholder tempdir"))
    }
}

impl Drop for Hub {
    fn drop(&mut self) {
        if let Some(child) = &mut self.child {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

pub struct HubBuilder {
    accounts: Vec<(String, String)>,
    max_depth: Option<u32>,
}

impl HubBuilder {
    /// Registers an account with the given bearer token.
    pub fn account(mut self, name: &str, token: &str) -> Self {
        self.accounts.push((name.to_string(), token.to_string()));
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Writes config + token files, then spawns `hubd` and waits for its
    /// socket to appear.
    pub fn spawn(self) -> Hub {
        let base_dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(base_dir.path().join("tokens")).expect("tokens dir");

        let accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|(name, _)| Account {
                name: name.clone(),
                config_dir: base_dir.path().to_string_lossy().into_owned(),
                provider: "anthropic".to_string(),
                color: None,
                label: None,
                capabilities: vec![],
            })
            .collect();

        for (name, token) in &self.accounts {
            let token_path = base_dir.path().join("tokens").join(format!("{name}.token"));
            std::fs::write(&token_path, token).expect("write token file");
            std::fs::set_permissions(&token_path, std::fs::Permissions::from_mode(0o600)).expect("chmod token file");
        }

        let config = serde_json::json!({
            "schemaVersion": 1,
            "accounts": accounts,
            "features": {
                "autoAcceptanceGate": true,
                "adaptiveSla": true,
                "autoLauncher": true,
            },
            "policy": {
                "maxDepth": self.max_depth,
            },
        });
        std::fs::write(base_dir.path().join("config.json"), serde_json::to_vec_pretty(&config).unwrap())
            .expect("write config");

        let child = Command::new(hubd_binary())
            .env("AGENTCTL_DIR", base_dir.path())
            .env_remove("RUST_LOG")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("hubd should spawn");

        let socket_path = base_dir.path().join("hub.sock");
        let up = wait_for(WAIT_MAX_MS, || socket_path.exists());
        assert!(up, "daemon socket never appeared");

        Hub { base_dir, child: Some(child) }
    }
}

/// A synchronous NDJSON client over one connection.
pub struct Client {
    stream: UnixStream,
    reader: BufReader<UnixStream>,
    next_id: AtomicU64,
}

impl Client {
    fn new(stream: UnixStream) -> Self {
        stream.set_read_timeout(Some(Duration::from_millis(WAIT_MAX_MS))).expect("set read timeout");
        let reader = BufReader::new(stream.try_clone().expect("clone stream"));
        Self { stream, reader, next_id: AtomicU64::new(0) }
    }

    fn request_id(&self) -> String {
        format!("r{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Writes one request line and reads one response line. Requests on a
    /// single connection are handled strictly in order, so this never
    /// needs to correlate by `requestId`.
    pub fn send(&mut self, request: Request) -> Response {
        let mut line = serde_json::to_string(&request).expect("encode request");
        line.push('\n');
        self.stream.write_all(line.as_bytes()).expect("write request");

        let mut raw = String::new();
        self.reader.read_line(&mut raw).expect("read response");
        assert!(!raw.is_empty(), "connection closed without a response");
        serde_json::from_str(raw.trim_end()).expect("parse response")
    }

    /// Like [`Client::send`], but returns `None` instead of panicking when
    /// the connection has been closed out from under it (e.g. superseded).
    pub fn try_send(&mut self, request: Request) -> Option<Response> {
        let mut line = serde_json::to_string(&request).expect("encode request");
        line.push('\n');
        self.stream.write_all(line.as_bytes()).ok()?;

        let mut raw = String::new();
        match self.reader.read_line(&mut raw) {
            Ok(0) => None,
            Ok(_) => serde_json::from_str(raw.trim_end()).ok(),
            Err(_) => None,
        }
    }

    pub fn auth(&mut self, account: &str, token: &str) -> Response {
        let request_id = self.request_id();
        self.send(Request::Auth { request_id, account: account.to_string(), token: token.to_string() })
    }

    pub fn ping(&mut self) -> Response {
        let request_id = self.request_id();
        self.send(Request::Ping { request_id })
    }

    pub fn health_check(&mut self) -> Response {
        let request_id = self.request_id();
        self.send(Request::HealthCheck { request_id })
    }

    pub fn config_reload(&mut self) -> Response {
        let request_id = self.request_id();
        self.send(Request::ConfigReload { request_id })
    }

    pub fn send_message(&mut self, to: &str, content: &str) -> Response {
        let request_id = self.request_id();
        self.send(Request::SendMessage { request_id, to: to.to_string(), content: content.to_string() })
    }

    pub fn read_messages(&mut self) -> Response {
        let request_id = self.request_id();
        self.send(Request::ReadMessages { request_id, limit: None, offset: None })
    }

    pub fn count_unread(&mut self) -> Response {
        let request_id = self.request_id();
        self.send(Request::CountUnread { request_id })
    }

    pub fn list_accounts(&mut self) -> Response {
        let request_id = self.request_id();
        self.send(Request::ListAccounts { request_id })
    }

    pub fn archive_messages(&mut self, days: u32) -> Response {
        let request_id = self.request_id();
        self.send(Request::ArchiveMessages { request_id, days })
    }

    pub fn handoff_task(&mut self, to: &str, payload: serde_json::Value) -> Response {
        let request_id = self.request_id();
        self.send(Request::HandoffTask { request_id, to: to.to_string(), payload, context: None })
    }

    pub fn handoff_accept(&mut self, handoff_id: &str) -> Response {
        let request_id = self.request_id();
        self.send(Request::HandoffAccept { request_id, handoff_id: handoff_id.to_string() })
    }

    pub fn update_task_status(&mut self, task_id: &str, status: &str, reason: Option<&str>) -> Response {
        let request_id = self.request_id();
        self.send(Request::UpdateTaskStatus {
            request_id,
            task_id: task_id.to_string(),
            status: status.to_string(),
            reason: reason.map(str::to_string),
            workspace: None,
        })
    }

    pub fn update_task_status_with_workspace(
        &mut self,
        task_id: &str,
        status: &str,
        workspace: hubd_wire::WorkspaceInput,
    ) -> Response {
        let request_id = self.request_id();
        self.send(Request::UpdateTaskStatus {
            request_id,
            task_id: task_id.to_string(),
            status: status.to_string(),
            reason: None,
            workspace: Some(workspace),
        })
    }

    pub fn report_progress(&mut self, task_id: &str, percent: u8, current_step: &str) -> Response {
        let request_id = self.request_id();
        self.send(Request::ReportProgress {
            request_id,
            task_id: task_id.to_string(),
            percent,
            current_step: current_step.to_string(),
            blockers: None,
            estimated_remaining_minutes: None,
            artifacts_produced: vec![],
        })
    }

    pub fn get_trust(&mut self, account: &str) -> Response {
        let request_id = self.request_id();
        self.send(Request::GetTrust { request_id, account: account.to_string() })
    }

    pub fn suggest_assignee(&mut self, required_skills: Vec<String>, exclude_accounts: Vec<String>) -> Response {
        let request_id = self.request_id();
        self.send(Request::SuggestAssignee { request_id, required_skills, exclude_accounts })
    }

    pub fn adaptive_sla_check(&mut self) -> Response {
        let request_id = self.request_id();
        self.send(Request::AdaptiveSlaCheck { request_id })
    }

    pub fn check_circuit_breaker(&mut self, target: &str) -> Response {
        let request_id = self.request_id();
        self.send(Request::CheckCircuitBreaker { request_id, target: target.to_string() })
    }

    pub fn reinstate_agent(&mut self, target: &str) -> Response {
        let request_id = self.request_id();
        self.send(Request::ReinstateAgent { request_id, target: target.to_string() })
    }
}

/// A minimal, acceptance-criteria-satisfying handoff payload for tests
/// that don't care about the auto-acceptance gate's classification.
pub fn minimal_payload(goal: &str) -> serde_json::Value {
    serde_json::json!({
        "goal": goal,
        "acceptance_criteria": ["it works"],
        "run_commands": ["echo ok"],
        "blocked_by": ["none"],
    })
}

pub fn response_data(response: &Response) -> &serde_json::Value {
    match response {
        Response::Result { data, .. } => data,
        other => panic!("expected a result response, got {other:?}"),
    }
}
