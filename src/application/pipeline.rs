//! # Command Pipeline
//!
//! One parameterised pipeline for every inbound transport:
//! classify → validate → route → record → summarise → notify.
//!
//! Each command runs to completion in its own task. Whatever happens inside, including
//! a panic, the sender gets exactly one summary.

use chrono::Local;
use serde::Serialize;
use std::sync::Arc;

use crate::application::activity::ActivityLog;
use crate::application::router::FailoverRouter;
use crate::application::utils::excerpt;
use crate::domain::action::Action;
use crate::domain::outcome::DispatchOutcome;
use crate::domain::traits::{Classifier, Notifier};
use crate::domain::types::{InboundCommand, LogCategory, LogEntry};
use crate::strings::{logs, messages};

/// Characters of a command or result kept in activity entries.
const ACTIVITY_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub action: Action,
    /// `None` when the command never reached the router.
    pub outcome: Option<DispatchOutcome>,
    pub summary: String,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().is_some_and(|o| o.succeeded)
    }
}

#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    classifier: Arc<dyn Classifier>,
    router: FailoverRouter,
    activity: Arc<ActivityLog>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        router: FailoverRouter,
        activity: Arc<ActivityLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                classifier,
                router,
                activity,
                notifier,
            }),
        }
    }

    pub fn activity(&self) -> &Arc<ActivityLog> {
        &self.inner.activity
    }

    pub async fn handle(&self, command: InboundCommand) -> PipelineReport {
        let inner = self.inner.clone();
        let task_command = command.clone();
        match tokio::spawn(async move { inner.run(task_command).await }).await {
            Ok(report) => report,
            Err(e) => self.inner.system_error(&command, &e.to_string()).await,
        }
    }

    /// Records a command the transport refused before it reached the pipeline and still
    /// sends the sender a failure summary. Returns that summary.
    pub async fn record_rejected(&self, command: &InboundCommand, reason: &str) -> String {
        tracing::warn!("{}", logs::command_rejected(&command.sender_id, reason));
        self.inner
            .activity
            .append(
                LogEntry::new(LogCategory::Error, logs::activity_error(reason))
                    .with_sender(&command.sender_id),
            )
            .await;
        let summary = messages::summary(
            &command.body,
            &Action::error(reason),
            None,
            &now(),
            self.inner.notifier.max_chars(),
        );
        self.inner.notify(&command.sender_id, &summary).await;
        summary
    }
}

impl PipelineInner {
    async fn run(&self, command: InboundCommand) -> PipelineReport {
        tracing::info!("{}", logs::inbound_command(&command.sender_id, &command.body));
        self.activity
            .append(
                LogEntry::new(
                    LogCategory::Inbound,
                    logs::activity_inbound(&excerpt(&command.body, ACTIVITY_EXCERPT_CHARS)),
                )
                .with_sender(&command.sender_id),
            )
            .await;

        let action = self.classifier.classify(&command.body).await;
        tracing::info!("{}", logs::classified(action.kind().as_str(), action.description()));

        if action.is_error() {
            self.record_error(&command, &action, action.description()).await;
            return self.finish(&command, action, None).await;
        }

        let Some(backend) = self.router.select().await else {
            let outcome = self.router.no_backend();
            self.record_error(&command, &action, &outcome.error_line().unwrap_or_default())
                .await;
            return self.finish(&command, action, Some(outcome)).await;
        };

        self.activity
            .append(
                LogEntry::new(
                    LogCategory::Dispatched,
                    logs::activity_dispatched(action.kind().as_str(), backend.label()),
                )
                .with_sender(&command.sender_id)
                .with_action(action.kind()),
            )
            .await;

        let outcome = self.router.dispatch(&backend, &action).await;

        if outcome.succeeded {
            let result = outcome.collected_text.as_deref().unwrap_or_default();
            self.activity
                .append(
                    LogEntry::new(LogCategory::Outcome, logs::activity_outcome(action.description()))
                        .with_sender(&command.sender_id)
                        .with_action(action.kind())
                        .with_result(excerpt(result, ACTIVITY_EXCERPT_CHARS)),
                )
                .await;
        } else {
            self.record_error(&command, &action, &outcome.error_line().unwrap_or_default())
                .await;
        }

        self.finish(&command, action, Some(outcome)).await
    }

    async fn record_error(&self, command: &InboundCommand, action: &Action, detail: &str) {
        tracing::warn!("{}", logs::command_failed(&command.sender_id, detail));
        self.activity
            .append(
                LogEntry::new(LogCategory::Error, logs::activity_error(detail))
                    .with_sender(&command.sender_id)
                    .with_action(action.kind()),
            )
            .await;
    }

    async fn finish(
        &self,
        command: &InboundCommand,
        action: Action,
        outcome: Option<DispatchOutcome>,
    ) -> PipelineReport {
        let summary = messages::summary(
            &command.body,
            &action,
            outcome.as_ref(),
            &now(),
            self.notifier.max_chars(),
        );
        self.notify(&command.sender_id, &summary).await;
        PipelineReport {
            action,
            outcome,
            summary,
        }
    }

    async fn system_error(&self, command: &InboundCommand, error: &str) -> PipelineReport {
        tracing::error!("{}", logs::pipeline_panicked(error));
        self.activity
            .append(
                LogEntry::new(LogCategory::Error, logs::activity_error("internal pipeline failure"))
                    .with_sender(&command.sender_id),
            )
            .await;
        let summary = messages::system_error_summary(
            &command.body,
            error,
            &now(),
            self.notifier.max_chars(),
        );
        self.notify(&command.sender_id, &summary).await;
        PipelineReport {
            action: Action::error("internal pipeline failure"),
            outcome: None,
            summary,
        }
    }

    async fn notify(&self, recipient: &str, summary: &str) {
        if let Err(e) = self.notifier.notify(recipient, summary).await {
            tracing::warn!("{}", logs::notify_failed(recipient, &e));
        }
    }
}

fn now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ActionKind;
    use crate::domain::config::{BackendDescriptor, RouterConfig};
    use crate::domain::outcome::DispatchErrorKind;
    use crate::infrastructure::classifier::LlmClassifier;
    use crate::testing::{
        BackendBehavior, FakeLlm, RecordingNotifier, closed_backend, spawn_backend,
    };
    use async_trait::async_trait;

    const HELLO_REPLY: &str = r#"```json
{"action": "create_file", "command": "Create a Python script that prints 'Hello World'", "description": "Creating a Python hello world script", "file_path": "hello.py"}
```"#;

    struct Harness {
        pipeline: Pipeline,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(llm: FakeLlm, backends: Vec<BackendDescriptor>) -> Harness {
        harness_with(Arc::new(LlmClassifier::new(Arc::new(llm))), backends, RecordingNotifier::default())
    }

    fn harness_with(
        classifier: Arc<dyn Classifier>,
        backends: Vec<BackendDescriptor>,
        notifier: RecordingNotifier,
    ) -> Harness {
        let router = FailoverRouter::new(
            backends,
            &RouterConfig {
                probe_timeout_ms: 500,
                execute_timeout_ms: 2_000,
                max_result_chars: 500,
            },
        )
        .unwrap();
        let notifier = Arc::new(notifier);
        Harness {
            pipeline: Pipeline::new(classifier, router, Arc::new(ActivityLog::new(50)), notifier.clone()),
            notifier,
        }
    }

    fn categories(entries: &[LogEntry]) -> Vec<LogCategory> {
        entries.iter().rev().map(|e| e.category).collect()
    }

    #[tokio::test]
    async fn test_hello_world_with_one_healthy_backend() {
        let backend = spawn_backend("ui", 0, BackendBehavior::reply("Created hello.py")).await;
        let h = harness(
            FakeLlm::replying(HELLO_REPLY),
            vec![backend.descriptor.clone(), closed_backend("chat", 1).await],
        );

        let report = h
            .pipeline
            .handle(InboundCommand::new("Create a Python hello world script", "+15550001111"))
            .await;

        assert_eq!(report.action.kind(), ActionKind::CreateFile);
        assert!(report.action.target_path().unwrap().ends_with(".py"));
        assert!(report.succeeded());
        assert_eq!(backend.executes(), 1);

        let entries = h.pipeline.activity().list().await;
        assert_eq!(
            categories(&entries),
            vec![LogCategory::Inbound, LogCategory::Dispatched, LogCategory::Outcome]
        );
        assert_eq!(entries[0].result_excerpt.as_deref(), Some("Created hello.py"));

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+15550001111");
        assert!(sent[0].1.starts_with("✅ SUCCESS"));
        assert_eq!(sent[0].1, report.summary);
    }

    #[tokio::test]
    async fn test_both_backends_down() {
        let h = harness(
            FakeLlm::replying(HELLO_REPLY),
            vec![closed_backend("ui", 0).await, closed_backend("chat", 1).await],
        );

        let report = h
            .pipeline
            .handle(InboundCommand::new("Create a Python hello world script", "+15550001111"))
            .await;

        let outcome = report.outcome.as_ref().unwrap();
        assert_eq!(outcome.error_kind, Some(DispatchErrorKind::NoBackendAvailable));
        assert!(report.summary.contains("FAILED"));
        assert!(report.summary.contains("Error"));

        let entries = h.pipeline.activity().list().await;
        assert_eq!(categories(&entries), vec![LogCategory::Inbound, LogCategory::Error]);
        assert_eq!(h.pipeline.activity().stats().await.errors, 1);
        assert_eq!(h.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_classifier_output_contacts_no_backend() {
        let backend = spawn_backend("ui", 0, BackendBehavior::reply("should not run")).await;
        let h = harness(
            FakeLlm::replying("I'm sorry, I can't help with that."),
            vec![backend.descriptor.clone()],
        );

        let report = h
            .pipeline
            .handle(InboundCommand::new("do the thing", "+15550001111"))
            .await;

        assert_eq!(report.action.kind(), ActionKind::Error);
        assert!(report.outcome.is_none());
        assert!(!report.summary.is_empty());
        assert_eq!(h.notifier.sent().len(), 1);
        assert_eq!(backend.probes(), 0);
        assert_eq!(backend.executes(), 0);
    }

    #[tokio::test]
    async fn test_failed_dispatch_is_logged_after_dispatch_entry() {
        let backend = spawn_backend(
            "ui",
            0,
            BackendBehavior::Status(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
        )
        .await;
        let h = harness(FakeLlm::replying(HELLO_REPLY), vec![backend.descriptor.clone()]);

        let report = h.pipeline.handle(InboundCommand::new("make hello.py", "+1555")).await;

        assert!(!report.succeeded());
        assert_eq!(
            categories(&h.pipeline.activity().list().await),
            vec![LogCategory::Inbound, LogCategory::Dispatched, LogCategory::Error]
        );
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_change_result() {
        let backend = spawn_backend("ui", 0, BackendBehavior::reply("done")).await;
        let h = harness_with(
            Arc::new(LlmClassifier::new(Arc::new(FakeLlm::replying(HELLO_REPLY)))),
            vec![backend.descriptor.clone()],
            RecordingNotifier::failing(),
        );

        let report = h.pipeline.handle(InboundCommand::new("hello world", "+1555")).await;
        assert!(report.succeeded());
        assert_eq!(h.notifier.sent().len(), 1);
    }

    struct PanickingClassifier;

    #[async_trait]
    impl Classifier for PanickingClassifier {
        async fn classify(&self, _text: &str) -> Action {
            panic!("classifier exploded")
        }
    }

    #[tokio::test]
    async fn test_rejected_command_still_gets_a_summary() {
        let h = harness(FakeLlm::replying(HELLO_REPLY), vec![]);

        let summary = h
            .pipeline
            .record_rejected(&InboundCommand::new("   ", "+15552223333"), "Message body is empty")
            .await;

        assert!(summary.starts_with("❌ FAILED"));
        assert!(summary.contains("Message body is empty"));
        assert!(summary.contains("🕐 Time: "));
        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], ("+15552223333".to_string(), summary));

        let stats = h.pipeline.activity().stats().await;
        assert_eq!((stats.total, stats.errors), (0, 1));
    }

    #[tokio::test]
    async fn test_panic_still_yields_one_summary() {
        let h = harness_with(Arc::new(PanickingClassifier), vec![], RecordingNotifier::default());

        let report = h.pipeline.handle(InboundCommand::new("anything", "+1555")).await;
        assert!(report.summary.starts_with("❌ SYSTEM ERROR"));
        assert_eq!(h.notifier.sent().len(), 1);

        // the pipeline keeps serving
        let report = h.pipeline.handle(InboundCommand::new("again", "+1555")).await;
        assert!(report.summary.contains("SYSTEM ERROR"));
        assert_eq!(h.pipeline.activity().stats().await.total, 2);
    }
}
