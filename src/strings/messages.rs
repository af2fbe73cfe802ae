//! # Messages
//!
//! User-facing text: the outbound summary, acknowledgements and HTTP error bodies.

use crate::application::utils::{excerpt, truncate_chars};
use crate::domain::action::Action;
use crate::domain::outcome::DispatchOutcome;

pub const COMMAND_ECHO_CHARS: usize = 30;
pub const RESULT_CHARS: usize = 50;
pub const ERROR_CHARS: usize = 50;

pub const EMPTY_MESSAGE: &str = "Message body is empty";

pub fn backend_ack(backend: &str) -> String {
    format!("✅ Command delivered to {backend}")
}

pub fn collector_ack(instruction_prefix: &str) -> String {
    format!("✅ Cursor processed: '{instruction_prefix}...'")
}

/// The single summary sent back for every command.
/// `outcome` is `None` when the command never reached the router.
pub fn summary(
    command: &str,
    action: &Action,
    outcome: Option<&DispatchOutcome>,
    time: &str,
    max_chars: usize,
) -> String {
    let echo = truncate_chars(command.trim(), COMMAND_ECHO_CHARS);
    let succeeded = outcome.is_some_and(|o| o.succeeded);

    let text = if succeeded {
        let result = outcome
            .and_then(|o| o.collected_text.as_deref())
            .unwrap_or("Message sent to Cursor AI");
        format!(
            "✅ SUCCESS\n📱 SMS: \"{echo}...\"\n🎯 Action: {}\n📄 Result: {}\n🕐 Time: {time}",
            action.description(),
            excerpt(result, RESULT_CHARS),
        )
    } else {
        let error = outcome
            .and_then(DispatchOutcome::error_line)
            .unwrap_or_else(|| action.description().to_string());
        format!(
            "❌ FAILED\n📱 SMS: \"{echo}...\"\n🎯 Action: {}\n❌ Error: {}\n🕐 Time: {time}",
            action.description(),
            excerpt(&error, ERROR_CHARS),
        )
    };
    truncate_chars(&text, max_chars).to_string()
}

/// Summary for a pipeline run that died before producing a result.
pub fn system_error_summary(command: &str, error: &str, time: &str, max_chars: usize) -> String {
    let text = format!(
        "❌ SYSTEM ERROR\n📱 SMS: \"{}...\"\n⚠️ Error: {}\n🕐 Time: {time}",
        truncate_chars(command.trim(), COMMAND_ECHO_CHARS),
        excerpt(error, ERROR_CHARS),
    );
    truncate_chars(&text, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::BackendDescriptor;
    use crate::domain::outcome::DispatchErrorKind;
    use crate::testing::run_code_action;

    #[test]
    fn test_success_summary() {
        let outcome = DispatchOutcome::success(
            BackendDescriptor::new("ui", "http://127.0.0.1:5002", 0),
            "Python 3.12.1".into(),
        );
        let text = summary(
            "What python version do I have installed on this machine",
            &run_code_action(),
            Some(&outcome),
            "12:34:56",
            320,
        );
        assert!(text.starts_with("✅ SUCCESS"));
        assert!(text.contains("\"What python version do I have ...\""));
        assert!(text.contains("Python 3.12.1"));
        assert!(text.ends_with("🕐 Time: 12:34:56"));
    }

    #[test]
    fn test_failure_summary_names_the_error() {
        let outcome = DispatchOutcome::failure(
            DispatchErrorKind::NoBackendAvailable,
            None,
            "no healthy backend among [http://127.0.0.1:5002]",
        );
        let text = summary("run it", &run_code_action(), Some(&outcome), "01:02:03", 320);
        assert!(text.starts_with("❌ FAILED"));
        assert!(text.contains("Error: no_backend_available"));
    }

    #[test]
    fn test_classification_failure_uses_description() {
        let action = Action::error("malformed classifier output: ???");
        let text = summary("gibberish", &action, None, "01:02:03", 320);
        assert!(text.contains("FAILED"));
        assert!(text.contains("malformed classifier output"));
    }

    #[test]
    fn test_summary_is_bounded() {
        let action = Action::error("x".repeat(1000));
        let text = summary(&"é".repeat(500), &action, None, "01:02:03", 40);
        assert_eq!(text.chars().count(), 40);

        let text = system_error_summary("cmd", &"boom ".repeat(100), "01:02:03", 320);
        assert!(text.starts_with("❌ SYSTEM ERROR"));
        assert!(text.chars().count() <= 320);
    }
}
