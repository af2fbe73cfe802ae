//! # Dispatch Outcome
//!
//! Result of routing one action to a backend and executing it.

use serde::Serialize;
use std::fmt;

use crate::domain::config::BackendDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchErrorKind {
    NoBackendAvailable,
    BackendRejected,
    ConnectionRefused,
    Timeout,
    AutomationTargetNotFound,
    Internal,
}

impl DispatchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchErrorKind::NoBackendAvailable => "no_backend_available",
            DispatchErrorKind::BackendRejected => "backend_rejected",
            DispatchErrorKind::ConnectionRefused => "connection_refused",
            DispatchErrorKind::Timeout => "timeout",
            DispatchErrorKind::AutomationTargetNotFound => "automation_target_not_found",
            DispatchErrorKind::Internal => "internal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "no_backend_available" => Some(DispatchErrorKind::NoBackendAvailable),
            "backend_rejected" => Some(DispatchErrorKind::BackendRejected),
            "connection_refused" => Some(DispatchErrorKind::ConnectionRefused),
            "timeout" => Some(DispatchErrorKind::Timeout),
            "automation_target_not_found" => Some(DispatchErrorKind::AutomationTargetNotFound),
            "internal" => Some(DispatchErrorKind::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub succeeded: bool,
    pub backend_used: Option<BackendDescriptor>,
    pub collected_text: Option<String>,
    pub error_kind: Option<DispatchErrorKind>,
    /// Full diagnostic text for logs. Only a truncated form leaves the process.
    #[serde(skip)]
    pub detail: Option<String>,
}

impl DispatchOutcome {
    pub fn success(backend: BackendDescriptor, collected_text: String) -> Self {
        Self {
            succeeded: true,
            backend_used: Some(backend),
            collected_text: Some(collected_text),
            error_kind: None,
            detail: None,
        }
    }

    pub fn failure(
        kind: DispatchErrorKind,
        backend: Option<BackendDescriptor>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            succeeded: false,
            backend_used: backend,
            collected_text: None,
            error_kind: Some(kind),
            detail: Some(detail.into()),
        }
    }

    /// One line describing the failure, e.g. `timeout: no reply within 60000ms`.
    pub fn error_line(&self) -> Option<String> {
        let kind = self.error_kind?;
        Some(match &self.detail {
            Some(detail) if !detail.is_empty() => format!("{kind}: {detail}"),
            _ => kind.to_string(),
        })
    }
}
