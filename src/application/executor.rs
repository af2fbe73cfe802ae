//! # Automation Executor
//!
//! Drives the editor through a fixed, linear sequence of UI steps:
//! Locate → Focus → OpenInputSurface → Clear → Inject → Submit → AwaitReply → Collect.
//! A failing step aborts the rest and is reported with the step's name. No step is retried.
//!
//! The editor has a single input surface, so runs are serialised by a one-slot semaphore.
//! Later requests queue instead of interleaving keystrokes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use crate::application::collector::ResponseCollector;
use crate::domain::automation::{Key, KeyChord, TargetError};
use crate::domain::config::AutomationConfig;
use crate::domain::outcome::DispatchErrorKind;
use crate::domain::traits::AutomationTarget;
use crate::strings::logs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationStep {
    Locate,
    Focus,
    OpenInputSurface,
    Clear,
    Inject,
    Submit,
    AwaitReply,
    Collect,
}

impl fmt::Display for AutomationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AutomationStep::Locate => "locate",
            AutomationStep::Focus => "focus",
            AutomationStep::OpenInputSurface => "open_input_surface",
            AutomationStep::Clear => "clear",
            AutomationStep::Inject => "inject",
            AutomationStep::Submit => "submit",
            AutomationStep::AwaitReply => "await_reply",
            AutomationStep::Collect => "collect",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutomationResult {
    Completed(String),
    Failed {
        step: AutomationStep,
        kind: DispatchErrorKind,
        reason: String,
    },
}

impl AutomationResult {
    fn failed(step: AutomationStep, error: TargetError) -> Self {
        let kind = match error {
            TargetError::NotFound(_) => DispatchErrorKind::AutomationTargetNotFound,
            TargetError::Timeout(_) => DispatchErrorKind::Timeout,
            _ => DispatchErrorKind::Internal,
        };
        AutomationResult::Failed {
            step,
            kind,
            reason: format!("{step} failed: {error}"),
        }
    }
}

pub struct AutomationExecutor {
    target: Arc<dyn AutomationTarget>,
    collector: ResponseCollector,
    config: AutomationConfig,
    chat_hotkey: KeyChord,
    gate: Semaphore,
}

impl AutomationExecutor {
    /// Fails only if the configured chat hotkey does not parse.
    pub fn new(
        target: Arc<dyn AutomationTarget>,
        collector: ResponseCollector,
        config: AutomationConfig,
    ) -> Result<Self, TargetError> {
        let chat_hotkey = KeyChord::parse(&config.chat_hotkey)?;
        Ok(Self {
            target,
            collector,
            config,
            chat_hotkey,
            gate: Semaphore::new(1),
        })
    }

    pub async fn execute(&self, instruction: &str) -> AutomationResult {
        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return AutomationResult::Failed {
                    step: AutomationStep::Locate,
                    kind: DispatchErrorKind::Internal,
                    reason: e.to_string(),
                };
            }
        };

        match self.run(instruction).await {
            Ok(text) => {
                tracing::info!("{}", logs::automation_completed(text.chars().count()));
                AutomationResult::Completed(text)
            }
            Err((step, error)) => {
                tracing::warn!("{}", logs::automation_failed(&step.to_string(), &error.to_string()));
                AutomationResult::failed(step, error)
            }
        }
    }

    async fn run(&self, instruction: &str) -> Result<String, (AutomationStep, TargetError)> {
        use AutomationStep::*;
        let marker = &self.config.window_marker;

        // Locate: first enumerated match wins
        let windows = self
            .target
            .find_windows(marker)
            .await
            .map_err(|e| (Locate, e))?;
        let Some(window) = windows.into_iter().next() else {
            return Err((Locate, TargetError::NotFound(marker.clone())));
        };
        tracing::debug!("{}", logs::window_located(&window.title));

        self.target.focus(&window).await.map_err(|e| (Focus, e))?;
        self.settle(self.config.focus_settle_ms).await;

        self.chord(OpenInputSurface, &self.chat_hotkey).await?;
        self.settle(self.config.surface_settle_ms).await;

        self.chord(Clear, &KeyChord::ctrl('a')).await?;
        self.settle(self.config.clear_settle_ms).await;
        self.chord(Clear, &KeyChord::key(Key::Delete)).await?;
        self.settle(self.config.clear_settle_ms).await;

        self.target
            .type_text(instruction, Duration::from_millis(self.config.type_interval_ms))
            .await
            .map_err(|e| (Inject, e))?;
        self.settle(self.config.inject_settle_ms).await;

        self.chord(Submit, &KeyChord::key(Key::Enter)).await?;

        self.await_reply().await;

        Ok(self.collector.collect(instruction).await)
    }

    async fn chord(
        &self,
        step: AutomationStep,
        chord: &KeyChord,
    ) -> Result<(), (AutomationStep, TargetError)> {
        self.target.send_chord(chord).await.map_err(|e| (step, e))
    }

    /// Polls the target's ready signal when it has one, otherwise waits the fixed dwell.
    /// Either way the wait is bounded; running out of polls is not an error.
    async fn await_reply(&self) {
        match self.target.reply_ready().await {
            None => {
                self.settle(self.config.reply_dwell_ms).await;
                return;
            }
            Some(true) => return,
            Some(false) => {}
        }
        for _ in 0..self.config.ready_max_polls {
            self.settle(self.config.ready_poll_ms).await;
            if self.target.reply_ready().await == Some(true) {
                return;
            }
        }
        tracing::debug!("{}", logs::reply_not_ready(self.config.ready_max_polls));
    }

    async fn settle(&self, ms: u64) {
        if ms > 0 {
            sleep(Duration::from_millis(ms)).await;
        }
    }
}
