//! # Response Collector
//!
//! Recovers the editor's reply through the clipboard. The clipboard is a best-effort side
//! channel, so `collect` never fails: when nothing plausible comes back it returns an
//! acknowledgement that echoes the instruction.

use std::sync::Arc;
use std::time::Duration;

use crate::application::utils::{tail_chars, truncate_chars};
use crate::domain::automation::KeyChord;
use crate::domain::config::CollectorConfig;
use crate::domain::traits::{AutomationTarget, ClipboardChannel};
use crate::strings::{logs, messages};

pub struct ResponseCollector {
    target: Arc<dyn AutomationTarget>,
    clipboard: Arc<dyn ClipboardChannel>,
    config: CollectorConfig,
}

impl ResponseCollector {
    pub fn new(
        target: Arc<dyn AutomationTarget>,
        clipboard: Arc<dyn ClipboardChannel>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            target,
            clipboard,
            config,
        }
    }

    pub async fn collect(&self, instruction: &str) -> String {
        match self.harvest().await {
            Some(text) => text,
            None => messages::collector_ack(truncate_chars(instruction.trim(), self.config.ack_prefix_chars)),
        }
    }

    /// Select-all, copy, read. Returns the tail of the transcript when it is long enough to trust.
    async fn harvest(&self) -> Option<String> {
        for chord in [KeyChord::ctrl('a'), KeyChord::ctrl('c')] {
            if let Err(e) = self.target.send_chord(&chord).await {
                tracing::warn!("{}", logs::collect_step_failed(&chord.to_string(), &e.to_string()));
                return None;
            }
        }
        tokio::time::sleep(Duration::from_millis(self.config.copy_settle_ms)).await;

        let text = match self.clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("{}", logs::collect_step_failed("clipboard read", &e));
                return None;
            }
        };

        let text = text.trim();
        if text.chars().count() <= self.config.min_plausible_chars {
            tracing::debug!("{}", logs::clipboard_implausible(text.chars().count()));
            return None;
        }
        Some(tail_chars(text, self.config.tail_chars).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClipboard, ScriptedTarget};

    fn config() -> CollectorConfig {
        CollectorConfig {
            copy_settle_ms: 0,
            ..Default::default()
        }
    }

    fn collector(target: ScriptedTarget, clipboard: FakeClipboard) -> ResponseCollector {
        ResponseCollector::new(Arc::new(target), Arc::new(clipboard), config())
    }

    #[tokio::test]
    async fn test_returns_tail_of_long_transcript() {
        let transcript = format!("{}THE REPLY", "x".repeat(400));
        let target = Arc::new(ScriptedTarget::with_windows(&[]));
        let collector = ResponseCollector::new(
            target.clone(),
            Arc::new(FakeClipboard::with_text(&transcript)),
            config(),
        );

        let text = collector.collect("anything").await;
        assert_eq!(text.chars().count(), 200);
        assert!(text.ends_with("THE REPLY"));
        assert_eq!(target.events(), vec!["chord:ctrl+a", "chord:ctrl+c"]);
    }

    #[tokio::test]
    async fn test_empty_clipboard_still_yields_text() {
        let text = collector(ScriptedTarget::with_windows(&[]), FakeClipboard::with_text(""))
            .collect("Create a Python hello world script")
            .await;
        assert!(!text.is_empty());
        assert!(text.contains("Create a Python hello world sc"));
        assert!(!text.contains("script"));
    }

    #[tokio::test]
    async fn test_short_clipboard_is_not_trusted() {
        let text = collector(ScriptedTarget::with_windows(&[]), FakeClipboard::with_text("exactly twenty chars"))
            .collect("ls")
            .await;
        assert_eq!(text, messages::collector_ack("ls"));
    }

    #[tokio::test]
    async fn test_failures_degrade_to_ack() {
        let text = collector(ScriptedTarget::with_windows(&[]), FakeClipboard::broken())
            .collect("run tests")
            .await;
        assert_eq!(text, messages::collector_ack("run tests"));

        let target = ScriptedTarget::with_windows(&[]).failing_on("chord:ctrl+c");
        let text = collector(target, FakeClipboard::with_text(&"y".repeat(100)))
            .collect("")
            .await;
        assert!(!text.is_empty());
    }
}
