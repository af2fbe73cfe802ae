//! In-memory stand-ins for the relay's collaborators, shared by unit tests.

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::action::{Action, ActionKind};
use crate::domain::automation::{KeyChord, TargetError, WindowHandle};
use crate::domain::config::BackendDescriptor;
use crate::domain::traits::{AutomationTarget, ClipboardChannel, LlmProvider, Notifier};

pub fn run_code_action() -> Action {
    Action::validated(
        ActionKind::RunCode,
        Some("python --version".into()),
        "Checking the Python version".into(),
        None,
    )
}

/// HTTP client for talking to loopback fakes, bypassing any configured proxy.
pub fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("http client")
}

/// Serves `app` on an ephemeral loopback port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake server");
    });
    format!("http://{}", addr)
}

/// A descriptor pointing at a port nothing listens on.
pub async fn closed_backend(name: &str, priority: u32) -> BackendDescriptor {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    BackendDescriptor::new(name, &format!("http://{}", addr), priority)
}

#[derive(Clone)]
pub enum BackendBehavior {
    Json(StatusCode, serde_json::Value),
    Status(StatusCode, String),
    Unhealthy,
    SlowHealth(Duration),
    SlowExecute(Duration),
}

impl BackendBehavior {
    pub fn reply(result: &str) -> Self {
        BackendBehavior::Json(
            StatusCode::OK,
            serde_json::json!({ "success": true, "result": result }),
        )
    }
}

#[derive(Clone)]
struct FakeBackendState {
    behavior: BackendBehavior,
    probes: Arc<AtomicUsize>,
    executes: Arc<AtomicUsize>,
    last_message: Arc<Mutex<Option<String>>>,
}

/// A loopback execution backend that counts probes and executions.
pub struct FakeBackend {
    pub descriptor: BackendDescriptor,
    probes: Arc<AtomicUsize>,
    executes: Arc<AtomicUsize>,
    last_message: Arc<Mutex<Option<String>>>,
}

impl FakeBackend {
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn executes(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<String> {
        self.last_message.lock().expect("lock").clone()
    }
}

pub async fn spawn_backend(name: &str, priority: u32, behavior: BackendBehavior) -> FakeBackend {
    let state = FakeBackendState {
        behavior,
        probes: Arc::new(AtomicUsize::new(0)),
        executes: Arc::new(AtomicUsize::new(0)),
        last_message: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route("/health", get(fake_health))
        .route("/execute", post(fake_execute))
        .with_state(state.clone());
    let base = serve(app).await;
    FakeBackend {
        descriptor: BackendDescriptor::new(name, &base, priority),
        probes: state.probes,
        executes: state.executes,
        last_message: state.last_message,
    }
}

async fn fake_health(State(state): State<FakeBackendState>) -> Response {
    state.probes.fetch_add(1, Ordering::SeqCst);
    match state.behavior {
        BackendBehavior::Unhealthy => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        BackendBehavior::SlowHealth(delay) => {
            tokio::time::sleep(delay).await;
            StatusCode::OK.into_response()
        }
        _ => Json(serde_json::json!({ "status": "healthy" })).into_response(),
    }
}

async fn fake_execute(
    State(state): State<FakeBackendState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.executes.fetch_add(1, Ordering::SeqCst);
    *state.last_message.lock().expect("lock") = body["message"].as_str().map(str::to_string);
    match state.behavior {
        BackendBehavior::Json(status, value) => (status, Json(value)).into_response(),
        BackendBehavior::Status(status, text) => (status, text).into_response(),
        BackendBehavior::SlowExecute(delay) => {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!({ "success": true, "result": "late" })).into_response()
        }
        BackendBehavior::Unhealthy | BackendBehavior::SlowHealth(_) => {
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// Records every call as a short event string, e.g. `chord:ctrl+l` or `type:hello`.
pub struct ScriptedTarget {
    windows: Vec<WindowHandle>,
    events: Mutex<Vec<String>>,
    /// Calls whose event string starts with this prefix fail.
    fail_on: Option<String>,
    /// `None` means the target has no ready signal.
    ready_script: Option<Mutex<VecDeque<bool>>>,
}

impl ScriptedTarget {
    pub fn with_windows(titles: &[&str]) -> Self {
        Self {
            windows: titles
                .iter()
                .enumerate()
                .map(|(i, title)| WindowHandle {
                    id: (i + 1).to_string(),
                    title: title.to_string(),
                })
                .collect(),
            events: Mutex::new(Vec::new()),
            fail_on: None,
            ready_script: None,
        }
    }

    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    /// Answers `reply_ready` from `script`; `false` once it runs out.
    pub fn with_ready_signal(mut self, script: &[bool]) -> Self {
        self.ready_script = Some(Mutex::new(script.iter().copied().collect()));
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }

    fn record(&self, event: String) -> Result<(), TargetError> {
        let fails = self
            .fail_on
            .as_ref()
            .is_some_and(|prefix| event.starts_with(prefix.as_str()));
        self.events.lock().expect("lock").push(event.clone());
        if fails {
            Err(TargetError::Driver(format!("scripted failure at {event}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AutomationTarget for ScriptedTarget {
    async fn find_windows(&self, marker: &str) -> Result<Vec<WindowHandle>, TargetError> {
        self.record(format!("find:{marker}"))?;
        let marker = marker.to_lowercase();
        Ok(self
            .windows
            .iter()
            .filter(|w| w.title.to_lowercase().contains(&marker))
            .cloned()
            .collect())
    }

    async fn focus(&self, window: &WindowHandle) -> Result<(), TargetError> {
        self.record(format!("focus:{}", window.id))
    }

    async fn send_chord(&self, chord: &KeyChord) -> Result<(), TargetError> {
        self.record(format!("chord:{chord}"))
    }

    async fn type_text(&self, text: &str, interval: Duration) -> Result<(), TargetError> {
        self.record(format!("type:{text}"))?;
        tokio::time::sleep(interval * text.chars().count() as u32).await;
        Ok(())
    }

    async fn reply_ready(&self) -> Option<bool> {
        let script = self.ready_script.as_ref()?;
        self.events.lock().expect("lock").push("ready?".to_string());
        Some(script.lock().expect("lock").pop_front().unwrap_or(false))
    }
}

pub struct FakeClipboard {
    content: Result<String, String>,
}

impl FakeClipboard {
    pub fn with_text(text: &str) -> Self {
        Self {
            content: Ok(text.to_string()),
        }
    }

    pub fn broken() -> Self {
        Self {
            content: Err("clipboard unavailable".to_string()),
        }
    }
}

#[async_trait]
impl ClipboardChannel for FakeClipboard {
    async fn read_text(&self) -> Result<String, String> {
        self.content.clone()
    }
}

/// Replies with a fixed completion and remembers the prompts it saw.
pub struct FakeLlm {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn completion(&self, prompt: &str) -> Result<String, String> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        self.reply.clone()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, summary: &str) -> Result<(), String> {
        self.sent
            .lock()
            .expect("lock")
            .push((recipient.to_string(), summary.to_string()));
        if self.fail {
            Err("transport down".to_string())
        } else {
            Ok(())
        }
    }

    fn max_chars(&self) -> usize {
        320
    }
}
