//! # LLM Client
//!
//! Provides the `Client` struct, the entry point for LLM interactions.
//! It is built once from the classifier configuration and routes every prompt to the configured provider.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::config::ClassifierConfig;
use crate::domain::traits::LlmProvider;
use crate::infrastructure::llm::providers::{self, ProviderConfig};
use crate::infrastructure::llm::{Context, Error, Provider, Response};

/// Output budget for a single classification.
const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Ceiling for any request; `classifier.timeout` narrows it per request.
const CLIENT_TIMEOUT_SECS: u64 = 120;

pub struct Client {
    http: reqwest::Client,
    provider: Provider,
    provider_config: ProviderConfig,
    temperature: Option<f32>,
}

impl Client {
    /// Resolves the provider and API key. A missing key is reported here, at start-up.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, Error> {
        let provider = Provider::from_str(&config.provider)
            .ok_or_else(|| Error::new(&config.provider, "Unknown provider"))?;
        let provider_config = ProviderConfig::from_classifier_config(config)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::new(provider.as_str(), format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            provider,
            provider_config,
            temperature: config.temperature,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.provider_config.default_model
    }

    /// Send a single user prompt to the configured model
    pub async fn prompt(&self, prompt: &str) -> Result<Response, Error> {
        let context = Context::prompt(prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(MAX_OUTPUT_TOKENS);
        self.chat(context).await
    }

    async fn chat(&self, context: Context) -> Result<Response, Error> {
        let response = providers::chat(
            &self.http,
            self.provider,
            self.provider_config.clone(),
            context,
        )
        .await?;
        tracing::debug!(
            "LLM [{}] {} tokens ({} prompt / {} completion)",
            response.model,
            response.usage.total_tokens,
            response.usage.prompt_tokens,
            response.usage.completion_tokens
        );
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for Client {
    async fn completion(&self, prompt: &str) -> Result<String, String> {
        self.prompt(prompt)
            .await
            .map(|r| r.content)
            .map_err(|e| e.to_string())
    }
}
