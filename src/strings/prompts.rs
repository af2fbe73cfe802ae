use crate::domain::action::ActionKind;

/// A builder for rendering prompts with context.
pub struct PromptRenderer<'a> {
    template: &'a str,
    replacements: Vec<(&'a str, String)>,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(template: &'a str) -> Self {
        Self {
            template,
            replacements: Vec::new(),
        }
    }

    pub fn set(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.replacements.push((key, value.into()));
        self
    }

    pub fn render(self) -> String {
        let mut result = self.template.to_string();
        for (key, value) in self.replacements {
            result = result.replace(key, &value);
        }

        // Any {{...}} left over is a template bug
        if let Some(start) = result.find("{{")
            && let Some(end) = result[start..].find("}}")
        {
            let placeholder = &result[start..start + end + 2];
            tracing::error!("Unreplaced placeholder in rendered prompt: {}", placeholder);
        }

        result
    }
}

pub const CLASSIFIER_TEMPLATE: &str = include_str!("../../prompts/classifier.md");

/// Prompt asking the model to classify one inbound message.
pub fn classifier_prompt(message: &str) -> String {
    let actions = ActionKind::ALL
        .iter()
        .filter(|k| **k != ActionKind::Error)
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    PromptRenderer::new(CLASSIFIER_TEMPLATE)
        .set("{{ACTIONS}}", actions)
        // Message last: user text may itself contain "{{"
        .set("{{MESSAGE}}", message.replace('"', "'"))
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_renderer_basic() {
        let renderer = PromptRenderer::new("Hello {{NAME}}").set("{{NAME}}", "World");
        assert_eq!(renderer.render(), "Hello World");
    }

    #[test]
    fn test_prompt_renderer_partial_replace() {
        let renderer = PromptRenderer::new("{{A}} and {{B}}").set("{{A}}", "Apple");
        assert_eq!(renderer.render(), "Apple and {{B}}");
    }

    #[test]
    fn test_classifier_prompt() {
        let prompt = classifier_prompt("Create a \"hello\" script");
        assert!(prompt.contains("The user sent: \"Create a 'hello' script\""));
        assert!(prompt.contains("create_file, edit_file, run_code, search_code, open_file, execute_command"));
        assert!(!prompt.contains("{{"));
    }
}
