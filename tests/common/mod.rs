//! In-memory transports for driving a `Session` without a network.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Notify};

use fxcm_session::config::SessionConfig;
use fxcm_session::error::{HttpError, WsError};
use fxcm_session::http::{CommandTransport, HttpRequest, HttpResponse};
use fxcm_session::session::Session;
use fxcm_session::shared::SessionState;
use fxcm_session::ws::{LifecycleEvent, PushConnection, PushTransport, TopicHandler};

pub const HOST: &str = "https://fxcm.test";
pub const TOKEN: &str = "token";
pub const EXECUTED: &str = r#"{"response":{"executed":true}}"#;

// ─── Command channel ─────────────────────────────────────────────────────────

struct Rule {
    path: String,
    needle: Option<String>,
    response: HttpResponse,
}

/// Records every request and answers from scripted rules.
///
/// Rules are matched newest first, on the resource path and optionally on
/// a substring of the query or body. Unmatched requests get [`EXECUTED`].
#[derive(Default)]
pub struct FakeCommands {
    requests: Mutex<Vec<HttpRequest>>,
    rules: Mutex<Vec<Rule>>,
    held: Mutex<Option<(String, Arc<Notify>)>>,
}

impl FakeCommands {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.rule(path, None, 200, body.to_string());
    }

    /// Answers `executed=false` for requests to `path` containing `needle`.
    pub fn reject_when(&self, path: &str, needle: &str, message: &str) {
        let body = serde_json::json!({"response": {"executed": false, "error": message}});
        self.rule(path, Some(needle), 200, body.to_string());
    }

    pub fn status(&self, path: &str, status: u16, body: &str) {
        self.rule(path, None, status, body.to_string());
    }

    fn rule(&self, path: &str, needle: Option<&str>, status: u16, body: String) {
        self.rules.lock().unwrap().push(Rule {
            path: path.to_string(),
            needle: needle.map(str::to_string),
            response: HttpResponse { status, body },
        });
    }

    /// Parks the next request to `path` after recording it, until the
    /// returned gate is notified.
    pub fn hold(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held.lock().unwrap() = Some((path.to_string(), Arc::clone(&gate)));
        gate
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests whose resource path is `path`.
    pub fn to_path(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| path_of(&r.url) == path)
            .collect()
    }
}

pub fn path_of(url: &str) -> &str {
    let rest = url.strip_prefix(HOST).unwrap_or(url);
    rest.split('?').next().unwrap_or(rest)
}

fn haystack(request: &HttpRequest) -> String {
    format!("{} {}", request.url, request.body.as_deref().unwrap_or(""))
}

#[async_trait]
impl CommandTransport for FakeCommands {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = {
            let rules = self.rules.lock().unwrap();
            let text = haystack(&request);
            rules
                .iter()
                .rev()
                .find(|rule| {
                    rule.path == path_of(&request.url)
                        && rule.needle.as_ref().map_or(true, |n| text.contains(n))
                })
                .map(|rule| rule.response.clone())
        };
        let gate = {
            let mut held = self.held.lock().unwrap();
            let matches = matches!(held.as_ref(), Some((path, _)) if path == path_of(&request.url));
            if matches {
                held.take().map(|(_, gate)| gate)
            } else {
                None
            }
        };
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(response.unwrap_or(HttpResponse {
            status: 200,
            body: EXECUTED.to_string(),
        }))
    }
}

// ─── Push stream ─────────────────────────────────────────────────────────────

/// A push transport whose session ids, topics and lifecycle the test drives.
#[derive(Default)]
pub struct FakePush {
    session_ids: Mutex<VecDeque<String>>,
    connect_error: Mutex<Option<String>>,
    connect_delay: Mutex<Option<Duration>>,
    lifecycle: Mutex<Option<mpsc::Sender<LifecycleEvent>>>,
    handlers: Mutex<HashMap<String, TopicHandler>>,
    on_calls: Mutex<HashMap<String, usize>>,
    off_calls: Mutex<HashMap<String, usize>>,
    closes: AtomicUsize,
}

impl FakePush {
    /// Each `connect` takes the next id; `""` simulates a missing one.
    pub fn with_session_ids(ids: &[&str]) -> Arc<Self> {
        let push = Self::default();
        *push.session_ids.lock().unwrap() = ids.iter().map(|s| s.to_string()).collect();
        Arc::new(push)
    }

    pub fn fail_next_connect(&self, reason: &str) {
        *self.connect_error.lock().unwrap() = Some(reason.to_string());
    }

    pub fn delay_connect(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = Some(delay);
    }

    /// Sends a lifecycle signal. Returns `false` once the session stopped
    /// listening.
    pub async fn emit(&self, event: LifecycleEvent) -> bool {
        let sender = self.lifecycle.lock().unwrap().clone();
        sender.expect("not connected").send(event).await.is_ok()
    }

    /// Delivers `payload` to the handler bound to `topic`. Returns whether
    /// one was bound.
    pub fn push(&self, topic: &str, payload: Value) -> bool {
        let handler = self.handlers.lock().unwrap().get(topic).cloned();
        match handler {
            Some(handler) => {
                handler(&payload);
                true
            }
            None => false,
        }
    }

    pub fn has_handler(&self, topic: &str) -> bool {
        self.handlers.lock().unwrap().contains_key(topic)
    }

    pub fn on_count(&self, topic: &str) -> usize {
        self.on_calls.lock().unwrap().get(topic).copied().unwrap_or(0)
    }

    pub fn off_count(&self, topic: &str) -> usize {
        self.off_calls.lock().unwrap().get(topic).copied().unwrap_or(0)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTransport for FakePush {
    async fn connect(&self, _host: &str, _access_token: &str) -> Result<PushConnection, WsError> {
        let delay = *self.connect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = self.connect_error.lock().unwrap().take() {
            return Err(WsError::ConnectionFailed(reason));
        }

        let session_id = self
            .session_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        let (tx, events) = mpsc::channel(16);
        *self.lifecycle.lock().unwrap() = Some(tx);
        Ok(PushConnection { session_id, events })
    }

    async fn on(&self, topic: &str, handler: TopicHandler) {
        self.handlers.lock().unwrap().insert(topic.to_string(), handler);
        *self.on_calls.lock().unwrap().entry(topic.to_string()).or_default() += 1;
    }

    async fn off(&self, topic: &str) {
        self.handlers.lock().unwrap().remove(topic);
        *self.off_calls.lock().unwrap().entry(topic.to_string()).or_default() += 1;
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn config() -> SessionConfig {
    let mut config = SessionConfig::new(HOST, TOKEN);
    config.connect_timeout = Duration::from_millis(200);
    config
}

pub fn session(commands: &Arc<FakeCommands>, push: &Arc<FakePush>) -> Session {
    Session::builder()
        .config(config())
        .command_transport(Arc::clone(commands) as Arc<dyn CommandTransport>)
        .push_transport(Arc::clone(push) as Arc<dyn PushTransport>)
        .build()
        .expect("session builds")
}

/// A session connected under `session_id`.
pub async fn connected(session_id: &str) -> (Session, Arc<FakeCommands>, Arc<FakePush>) {
    let commands = FakeCommands::new();
    let push = FakePush::with_session_ids(&[session_id]);
    let session = session(&commands, &push);
    session.connect().await.expect("connect succeeds");
    (session, commands, push)
}

const WAIT_LIMIT: Duration = Duration::from_secs(2);
const POLL_EVERY: Duration = Duration::from_millis(5);

pub async fn wait_for_state(session: &Session, state: SessionState) {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while session.state().await != state {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {state}"
        );
        tokio::time::sleep(POLL_EVERY).await;
    }
}

/// Polls `check` until it holds.
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while !check() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(POLL_EVERY).await;
    }
}

pub fn authorization(request: &HttpRequest) -> &str {
    request.header("Authorization").unwrap_or_default()
}
