//! # Failover Router
//!
//! Picks the first healthy execution backend in priority order and forwards an action to it.
//! Health is re-probed on every dispatch. There is no retry: a failed dispatch is terminal
//! for that command and is reported upward.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::application::utils::{excerpt, truncate_chars};
use crate::domain::action::Action;
use crate::domain::config::{AppConfig, BackendDescriptor, RouterConfig};
use crate::domain::outcome::{DispatchErrorKind, DispatchOutcome};
use crate::strings::{logs, messages};

/// Characters of a rejecting backend's body kept for diagnostics.
const BODY_EXCERPT_CHARS: usize = 200;

/// Body of `POST /execute` replies. Every field is optional so that
/// minimal backends (a bare `200`) still count as success.
#[derive(Debug, Deserialize, Default)]
struct ExecuteReply {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_kind: Option<String>,
}

pub struct FailoverRouter {
    http: reqwest::Client,
    backends: Vec<BackendDescriptor>,
    probe_timeout: Duration,
    execute_timeout: Duration,
    max_result_chars: usize,
}

impl FailoverRouter {
    pub fn new(backends: Vec<BackendDescriptor>, config: &RouterConfig) -> Result<Self> {
        // Backends live on loopback; never send them through a proxy
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        for backend in &backends {
            backend.base_url()?;
        }
        // Stable, so equal priorities keep their configured order
        let mut backends = backends;
        backends.sort_by_key(|b| b.priority);

        Ok(Self {
            http,
            backends,
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            execute_timeout: Duration::from_millis(config.execute_timeout_ms),
            max_result_chars: config.max_result_chars,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.backends.clone(), &config.router)
    }

    /// Backends in the order they are tried.
    pub fn backends(&self) -> &[BackendDescriptor] {
        &self.backends
    }

    /// `GET address + health_path` within the probe timeout. Any 2xx is healthy.
    pub async fn probe(&self, backend: &BackendDescriptor) -> bool {
        let url = match backend.health_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("{}", logs::probe_unhealthy(backend.label(), &e.to_string()));
                return false;
            }
        };
        match self
            .http
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!("{}", logs::probe_unhealthy(backend.label(), &response.status().to_string()));
                false
            }
            Err(e) => {
                tracing::debug!("{}", logs::probe_unhealthy(backend.label(), &e.to_string()));
                false
            }
        }
    }

    /// First healthy backend in ascending priority, or `None`.
    pub async fn select(&self) -> Option<BackendDescriptor> {
        for backend in &self.backends {
            if self.probe(backend).await {
                tracing::info!("{}", logs::backend_selected(backend.label(), &backend.address));
                return Some(backend.clone());
            }
        }
        tracing::warn!("{}", logs::NO_BACKEND_HEALTHY);
        None
    }

    /// Sends the action's execution request to `backend` and maps the reply to an outcome.
    pub async fn dispatch(&self, backend: &BackendDescriptor, action: &Action) -> DispatchOutcome {
        if action.is_error() {
            return DispatchOutcome::failure(
                DispatchErrorKind::Internal,
                None,
                "error actions are never dispatched",
            );
        }

        let url = match backend.execute_url() {
            Ok(url) => url,
            Err(e) => {
                return DispatchOutcome::failure(DispatchErrorKind::Internal, Some(backend.clone()), e.to_string());
            }
        };
        let message = action.execution_request();
        let sent = self
            .http
            .post(url)
            .timeout(self.execute_timeout)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => return self.transport_failure(backend, e),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(backend, e),
        };
        let reply = serde_json::from_str::<ExecuteReply>(&body).ok();

        if status.is_success() {
            let reply = reply.unwrap_or_default();
            if reply.success == Some(false) {
                let detail = reply
                    .error
                    .unwrap_or_else(|| "backend reported failure".to_string());
                return self.rejected(backend, reply.error_kind.as_deref(), detail);
            }
            let text = reply
                .result
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| messages::backend_ack(backend.label()));
            let text = truncate_chars(&text, self.max_result_chars).to_string();
            return DispatchOutcome::success(backend.clone(), text);
        }

        let (kind_hint, detail) = match reply {
            Some(ExecuteReply {
                error: Some(error),
                error_kind,
                ..
            }) => (error_kind, format!("HTTP {}: {}", status.as_u16(), error)),
            Some(reply) => (
                reply.error_kind,
                format!("HTTP {}: {}", status.as_u16(), excerpt(&body, BODY_EXCERPT_CHARS)),
            ),
            None => (
                None,
                format!("HTTP {}: {}", status.as_u16(), excerpt(&body, BODY_EXCERPT_CHARS)),
            ),
        };
        self.rejected(backend, kind_hint.as_deref(), detail)
    }

    /// `select` followed by `dispatch`.
    pub async fn route(&self, action: &Action) -> DispatchOutcome {
        match self.select().await {
            Some(backend) => self.dispatch(&backend, action).await,
            None => self.no_backend(),
        }
    }

    pub fn no_backend(&self) -> DispatchOutcome {
        let tried = self
            .backends
            .iter()
            .map(|b| b.address.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        DispatchOutcome::failure(
            DispatchErrorKind::NoBackendAvailable,
            None,
            format!("no healthy backend among [{}]", tried),
        )
    }

    /// Backends may name `automation_target_not_found`; everything else is a rejection.
    fn rejected(
        &self,
        backend: &BackendDescriptor,
        kind_hint: Option<&str>,
        detail: String,
    ) -> DispatchOutcome {
        let kind = match kind_hint.and_then(DispatchErrorKind::from_str) {
            Some(DispatchErrorKind::AutomationTargetNotFound) => {
                DispatchErrorKind::AutomationTargetNotFound
            }
            _ => DispatchErrorKind::BackendRejected,
        };
        tracing::warn!("{}", logs::dispatch_failed(backend.label(), kind.as_str(), &detail));
        DispatchOutcome::failure(kind, Some(backend.clone()), detail)
    }

    fn transport_failure(&self, backend: &BackendDescriptor, e: reqwest::Error) -> DispatchOutcome {
        let (kind, detail) = if e.is_timeout() {
            (
                DispatchErrorKind::Timeout,
                format!("no reply within {}ms", self.execute_timeout.as_millis()),
            )
        } else if e.is_connect() {
            (DispatchErrorKind::ConnectionRefused, e.to_string())
        } else {
            (DispatchErrorKind::Internal, e.to_string())
        };
        tracing::warn!("{}", logs::dispatch_failed(backend.label(), kind.as_str(), &detail));
        DispatchOutcome::failure(kind, Some(backend.clone()), detail)
    }
}
