//! # Domain Types
//!
//! Common data structures shared by the pipeline, the activity log and the HTTP interface.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::action::ActionKind;

/// A command as delivered by the inbound transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundCommand {
    pub body: String,
    pub sender_id: String,
}

impl InboundCommand {
    pub fn new(body: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            sender_id: sender_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Inbound,
    Dispatched,
    Outcome,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub category: LogCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_kind: Option<ActionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_excerpt: Option<String>,
}

impl LogEntry {
    pub fn new(category: LogCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            category,
            message: message.into(),
            sender_id: None,
            action_kind: None,
            result_excerpt: None,
        }
    }

    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    pub fn with_action(mut self, kind: ActionKind) -> Self {
        self.action_kind = Some(kind);
        self
    }

    pub fn with_result(mut self, excerpt: impl Into<String>) -> Self {
        self.result_excerpt = Some(excerpt.into());
        self
    }
}

/// Counts derived from the current activity buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityStats {
    /// Inbound commands still in the buffer.
    pub total: usize,
    pub successes: usize,
    pub errors: usize,
}
