//! # LLM Classifier
//!
//! Adapter between the generative model and the validator. It owns the prompt and the
//! presentation clean-up (code fences); the validator sees only bare JSON.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::utils::{excerpt, strip_code_fences};
use crate::application::validator;
use crate::domain::action::Action;
use crate::domain::traits::{Classifier, LlmProvider};
use crate::strings::{logs, prompts};

pub struct LlmClassifier {
    llm: Arc<dyn LlmProvider>,
}

impl LlmClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Action {
        let prompt = prompts::classifier_prompt(text);
        match self.llm.completion(&prompt).await {
            Ok(raw) => {
                tracing::debug!("Classifier raw output: {}", raw);
                validator::validate(strip_code_fences(&raw))
            }
            Err(e) => {
                tracing::error!("{}", logs::classifier_failed(&e));
                Action::error(format!("classifier unavailable: {}", excerpt(&e, 100)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ActionKind;
    use crate::testing::FakeLlm;

    #[tokio::test]
    async fn test_fenced_output_is_unwrapped() {
        let llm = Arc::new(FakeLlm::replying(
            "```json\n{\"action\": \"create_file\", \"command\": \"Create a Python script that prints 'Hello World'\", \"description\": \"Creating a Python hello world script\", \"file_path\": \"hello.py\"}\n```",
        ));
        let action = LlmClassifier::new(llm.clone())
            .classify("Create a Python hello world script")
            .await;

        assert_eq!(action.kind(), ActionKind::CreateFile);
        assert_eq!(action.target_path(), Some("hello.py"));
        assert!(llm.prompts()[0].contains("Create a Python hello world script"));
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_error_action() {
        let action = LlmClassifier::new(Arc::new(FakeLlm::failing("[gemini] HTTP 429")))
            .classify("anything")
            .await;
        assert!(action.is_error());
        assert!(action.description().starts_with("classifier unavailable"));
    }

    #[tokio::test]
    async fn test_prose_output_becomes_error_action() {
        let action = LlmClassifier::new(Arc::new(FakeLlm::replying("Sure! I'd be happy to help.")))
            .classify("hi")
            .await;
        assert!(action.is_error());
        assert!(action.description().contains("malformed"));
    }
}
