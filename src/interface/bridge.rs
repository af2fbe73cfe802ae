//! # Bridge HTTP Interface
//!
//! The desktop-side execution backend. `POST /execute` drives the editor through one
//! automation run; `GET /health` is what the gateway's router probes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::executor::{AutomationExecutor, AutomationResult};
use crate::domain::outcome::DispatchErrorKind;
use crate::strings::messages;

pub struct BridgeState {
    pub executor: Arc<AutomationExecutor>,
    /// Driver name reported by `/health`.
    pub driver: &'static str,
}

pub fn router(state: Arc<BridgeState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/execute", post(execute))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    #[serde(default)]
    message: String,
}

async fn execute(State(state): State<Arc<BridgeState>>, Json(request): Json<ExecuteRequest>) -> Response {
    let instruction = request.message.trim().to_string();
    if instruction.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": messages::EMPTY_MESSAGE })),
        )
            .into_response();
    }

    // Spawned so the run finishes even if the caller gives up and drops the connection
    let executor = state.executor.clone();
    let run = tokio::spawn(async move { executor.execute(&instruction).await });

    match run.await {
        Ok(AutomationResult::Completed(result)) => {
            Json(json!({ "success": true, "result": result })).into_response()
        }
        Ok(AutomationResult::Failed { kind, reason, .. }) => failure(kind, reason),
        Err(e) => failure(DispatchErrorKind::Internal, e.to_string()),
    }
}

fn failure(kind: DispatchErrorKind, reason: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": reason,
            "error_kind": kind.as_str(),
        })),
    )
        .into_response()
}

async fn health(State(state): State<Arc<BridgeState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "method": state.driver,
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}
