use crate::config::Settings;
use crate::notify::{EmailMessage, Notifier};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transactional email delivery via the Resend HTTP API.
#[derive(Debug, Clone)]
pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    sender: String,
}

impl ResendClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_email_api_key()?.to_string();
        let sender = settings.require_sender_address()?.to_string();
        let base_url =
            std::env::var("EMAIL_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("EMAIL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build email http client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            sender,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

#[async_trait::async_trait]
impl Notifier for ResendClient {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let req = SendEmailRequest {
            from: &self.sender,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("email request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read email response body")?;
        if !status.is_success() {
            anyhow::bail!("email delivery HTTP {status}: {text}");
        }

        tracing::info!(
            recipients = message.to.len(),
            subject = %message.subject,
            "email sent"
        );
        Ok(())
    }
}
