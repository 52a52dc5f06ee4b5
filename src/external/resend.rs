use super::{Mailer, SUBJECT, html_body};
use crate::config::ResendConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SendEmailRequest {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Deserialize)]
struct ResendErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Transactional email through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    config: ResendConfig,
    api_key: String,
}

impl ResendMailer {
    pub fn new(config: ResendConfig, client: Client) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("RESEND_API_KEY is required".to_string()))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn build_request(&self, to: &str, code: &str) -> SendEmailRequest {
        SendEmailRequest {
            from: self.config.from_email.clone(),
            to: vec![to.to_string()],
            subject: SUBJECT.to_string(),
            html: html_body(code),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn provider(&self) -> &'static str {
        "resend"
    }

    async fn send_code(&self, to: &str, code: &str) -> AppResult<()> {
        let url = format!("{}/emails", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(to, code))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Resend request failed: {e}")))?;

        if response.status().is_success() {
            log::info!("Verification email sent via Resend: {}", to);
            return Ok(());
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ResendErrorResponse>(&error_text)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(error_text);
        log::error!("Resend rejected email to {}: HTTP {}: {}", to, status, message);
        Err(AppError::ExternalApiError(format!(
            "Resend send failed: {message}"
        )))
    }
}
