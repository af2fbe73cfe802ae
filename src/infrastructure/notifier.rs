//! # Notifiers
//!
//! Outbound delivery of command summaries: Twilio SMS when credentials are configured,
//! otherwise a notifier that only writes the summary to the log.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

use crate::application::utils::{excerpt, is_loopback};
use crate::domain::config::NotifierConfig;
use crate::domain::traits::Notifier;
use crate::strings::logs;

const TWILIO_API: &str = "https://api.twilio.com";

pub struct TwilioNotifier {
    http: reqwest::Client,
    messages_url: Url,
    account_sid: String,
    auth_token: String,
    from_number: String,
    max_chars: usize,
}

impl TwilioNotifier {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_number: String,
        base_url: Option<String>,
        max_chars: usize,
    ) -> Result<Self> {
        let base = base_url.as_deref().unwrap_or(TWILIO_API);
        let mut base = Url::parse(base).with_context(|| format!("Invalid Twilio endpoint: {base}"))?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        let messages_url = base
            .join(&format!("2010-04-01/Accounts/{account_sid}/Messages.json"))
            .context("Invalid Twilio account SID")?;

        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(15));
        // Local Twilio stand-ins are reached directly
        if is_loopback(&messages_url) {
            builder = builder.no_proxy();
        }
        let http = builder.build().context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            messages_url,
            account_sid,
            auth_token,
            from_number,
            max_chars,
        })
    }

}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn notify(&self, recipient: &str, summary: &str) -> Result<(), String> {
        if !recipient.starts_with('+') {
            return Err(format!("'{recipient}' is not an E.164 phone number"));
        }

        let response = self
            .http
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", recipient),
                ("From", self.from_number.as_str()),
                ("Body", summary),
            ])
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("{}", logs::summary_sent(recipient));
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(format!("HTTP {}: {}", status.as_u16(), excerpt(&body, 200)))
        }
    }

    fn max_chars(&self) -> usize {
        self.max_chars
    }
}

pub struct LogNotifier {
    max_chars: usize,
}

impl LogNotifier {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, summary: &str) -> Result<(), String> {
        tracing::info!("{}", logs::summary_logged(recipient, summary));
        Ok(())
    }

    fn max_chars(&self) -> usize {
        self.max_chars
    }
}

/// Twilio when all three credentials resolve, the log otherwise.
pub fn from_config(config: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    let max_chars = config.summary_limit();
    match config.credentials() {
        Some((sid, token, from)) => Ok(Arc::new(TwilioNotifier::new(
            sid,
            token,
            from,
            config.endpoint.clone(),
            max_chars,
        )?)),
        None => {
            tracing::warn!("{}", logs::SMS_DISABLED);
            Ok(Arc::new(LogNotifier::new(max_chars)))
        }
    }
}
