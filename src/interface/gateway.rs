//! # Gateway HTTP Interface
//!
//! Inbound transports (Twilio SMS webhook, manual JSON trigger) and the dashboard read API.

use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::pipeline::Pipeline;
use crate::domain::types::InboundCommand;
use crate::strings::{messages, templates};

/// Prefix Twilio trial accounts put on forwarded messages.
pub const TRIAL_PREFIX: &str = "Sent from your Twilio trial account - ";

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// Sender id used for manual triggers that name no sender.
pub const DASHBOARD_SENDER: &str = "dashboard";

pub struct GatewayState {
    pub pipeline: Pipeline,
    /// Our own Twilio number; messages from it are auto-forwards.
    pub own_number: Option<String>,
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/activity", get(activity))
        .route("/sms", post(sms_webhook))
        .route("/trigger", post(trigger))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SmsForm {
    #[serde(rename = "Body", default)]
    body: String,
    #[serde(rename = "From", default)]
    from: String,
}

#[derive(Debug, Deserialize)]
struct TriggerRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    sender: Option<String>,
}

/// Strips the trial-account banner from messages we forwarded to ourselves.
pub fn normalize_body(body: &str, from: &str, own_number: Option<&str>) -> String {
    let body = body.trim();
    if own_number.is_some_and(|own| own == from) {
        if let Some(rest) = body.strip_prefix(TRIAL_PREFIX) {
            return rest.trim().to_string();
        }
    }
    body.to_string()
}

async fn sms_webhook(State(state): State<Arc<GatewayState>>, Form(form): Form<SmsForm>) -> Response {
    let body = normalize_body(&form.body, &form.from, state.own_number.as_deref());
    let command = InboundCommand::new(body, form.from);

    // The summary goes out through the notifier; Twilio only gets an empty reply
    if command.body.is_empty() {
        state.pipeline.record_rejected(&command, messages::EMPTY_MESSAGE).await;
    } else {
        state.pipeline.handle(command).await;
    }

    ([(header::CONTENT_TYPE, "text/xml")], EMPTY_TWIML).into_response()
}

async fn trigger(State(state): State<Arc<GatewayState>>, Json(request): Json<TriggerRequest>) -> Response {
    let sender = request
        .sender
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DASHBOARD_SENDER.to_string());
    let command = InboundCommand::new(request.message.trim(), sender);
    if command.body.is_empty() {
        let summary = state.pipeline.record_rejected(&command, messages::EMPTY_MESSAGE).await;
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": messages::EMPTY_MESSAGE, "summary": summary })),
        )
            .into_response();
    }

    let report = state.pipeline.handle(command).await;
    Json(report).into_response()
}

async fn activity(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let log = state.pipeline.activity();
    Json(json!({
        "logs": log.list().await,
        "stats": log.stats().await,
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn dashboard() -> Html<&'static str> {
    Html(templates::DASHBOARD_HTML)
}
