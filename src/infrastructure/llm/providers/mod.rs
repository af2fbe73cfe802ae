//! # LLM Providers
//!
//! Request/response mapping for each supported API family.
//! Gemini has its own wire format; everything else speaks the OpenAI chat-completions dialect.

mod gemini;
mod openai;

use crate::domain::config::ClassifierConfig;
use crate::infrastructure::llm::{Context, Error, Provider, Response};

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for non-default endpoints)
    pub base_url: Option<String>,
    /// Default model
    pub default_model: String,
    /// Timeout in seconds
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    pub fn from_classifier_config(config: &ClassifierConfig) -> Result<Self, Error> {
        let api_key = if let Some(key) = config.api_key.as_ref().filter(|k| !k.is_empty()) {
            key.clone()
        } else if let Some(env_var) = &config.api_key_env {
            std::env::var(env_var).map_err(|e| {
                Error::new(
                    &config.provider,
                    format!("API key env var {} not set: {}", env_var, e),
                )
            })?
        } else {
            return Err(Error::new(
                &config.provider,
                "No API key provided - set api_key or api_key_env",
            ));
        };

        Ok(Self {
            api_key,
            base_url: config.endpoint.clone(),
            default_model: config.model.clone(),
            timeout: config.timeout,
        })
    }
}

/// Execute a chat request with the specified provider
pub async fn chat(
    http: &reqwest::Client,
    provider: Provider,
    config: ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    match provider {
        Provider::OpenAI => openai::chat(http, config, context).await,
        Provider::Groq => {
            let config_with_url = ProviderConfig {
                base_url: config
                    .base_url
                    .or_else(|| Some("https://api.groq.com/openai/v1".to_string())),
                ..config
            };
            openai::chat(http, config_with_url, context).await
        }
        Provider::XAI => {
            let config_with_url = ProviderConfig {
                base_url: config
                    .base_url
                    .or_else(|| Some("https://api.x.ai/v1".to_string())),
                ..config
            };
            openai::chat(http, config_with_url, context).await
        }
        Provider::Gemini => gemini::chat(http, config, context).await,
    }
}

/// Pulls `error.message` out of a JSON error body, falling back to the raw text.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_literal_wins_over_env() {
        let config = ClassifierConfig {
            api_key: Some("literal".into()),
            api_key_env: Some("RELAY_TEST_UNSET_KEY_VAR".into()),
            ..Default::default()
        };
        let provider_config = ProviderConfig::from_classifier_config(&config).unwrap();
        assert_eq!(provider_config.api_key, "literal");
        assert_eq!(provider_config.default_model, config.model);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let config = ClassifierConfig {
            api_key: None,
            api_key_env: Some("RELAY_TEST_UNSET_KEY_VAR".into()),
            ..Default::default()
        };
        let err = ProviderConfig::from_classifier_config(&config).err().unwrap();
        assert_eq!(err.provider, "gemini");
        assert!(err.message.contains("RELAY_TEST_UNSET_KEY_VAR"));

        let config = ClassifierConfig {
            api_key: None,
            api_key_env: None,
            ..Default::default()
        };
        assert!(ProviderConfig::from_classifier_config(&config).is_err());
    }

    #[test]
    fn test_api_error_message() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            api_error_message(status, r#"{"error":{"message":"API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(api_error_message(status, "nope"), "HTTP 400 Bad Request: nope");
    }
}
