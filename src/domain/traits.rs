//! # Domain Traits
//!
//! Abstract interfaces for the system's collaborators (LLM, classifier, notifier, desktop).
//! Allows for pluggable implementations in the Infrastructure layer and fakes in tests.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::action::Action;
use crate::domain::automation::{KeyChord, TargetError, WindowHandle};

/// Abstract interface for an LLM Provider
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion
    async fn completion(&self, prompt: &str) -> Result<String, String>;
}

/// Turns free text into an `Action`. Never fails: problems become `error` actions.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Action;
}

/// Outbound delivery of the per-command summary.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, summary: &str) -> Result<(), String>;

    /// Upper bound on the summary length the transport accepts.
    fn max_chars(&self) -> usize;
}

/// The foreign GUI application, seen only through windows and keystrokes.
#[async_trait]
pub trait AutomationTarget: Send + Sync {
    /// Visible top-level windows whose title contains `marker`, in enumeration order.
    async fn find_windows(&self, marker: &str) -> Result<Vec<WindowHandle>, TargetError>;

    /// Restore the window if minimised and raise it to the foreground.
    async fn focus(&self, window: &WindowHandle) -> Result<(), TargetError>;

    async fn send_chord(&self, chord: &KeyChord) -> Result<(), TargetError>;

    /// Type `text` one character at a time with `interval` between characters.
    async fn type_text(&self, text: &str, interval: Duration) -> Result<(), TargetError>;

    /// Whether the target has finished replying. `None` means the target
    /// exposes no such signal and the caller must fall back to a fixed dwell.
    async fn reply_ready(&self) -> Option<bool> {
        None
    }
}

/// Read side of the shared system clipboard.
#[async_trait]
pub trait ClipboardChannel: Send + Sync {
    async fn read_text(&self) -> Result<String, String>;
}
