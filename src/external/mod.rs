pub mod resend;
pub mod ses;

pub use resend::ResendMailer;
pub use ses::SesMailer;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

pub const SUBJECT: &str = "Your UNT Love Code";

pub fn text_body(code: &str) -> String {
    format!("Your verification code is: {code}")
}

pub fn html_body(code: &str) -> String {
    format!("<p>Your verification code is: <strong>{code}</strong></p>")
}

/// Delivers one-time codes to an address.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn send_code(&self, to: &str, code: &str) -> AppResult<()>;
}

pub type SharedMailer = Arc<dyn Mailer>;

/// Development stand-in that logs the code instead of sending it.
#[derive(Clone, Default)]
pub struct DevLogMailer;

#[async_trait]
impl Mailer for DevLogMailer {
    fn provider(&self) -> &'static str {
        "dev-log"
    }

    async fn send_code(&self, to: &str, code: &str) -> AppResult<()> {
        log::info!("[dev mailer] {} -> code: {}", to, code);
        Ok(())
    }
}

/// Picks exactly one provider: Resend, then SES, then (development only) the
/// log mailer.
pub fn build_mailer(config: &Config, client: Client) -> AppResult<SharedMailer> {
    if config.resend.is_configured() {
        return Ok(Arc::new(ResendMailer::new(config.resend.clone(), client)?));
    }
    if config.ses.is_configured() {
        return Ok(Arc::new(SesMailer::new(&config.ses, client)?));
    }
    if !config.is_production() {
        log::warn!("No email provider configured, verification codes will be logged");
        return Ok(Arc::new(DevLogMailer));
    }
    Err(AppError::ConfigError(
        "Set RESEND_API_KEY (and optionally RESEND_FROM_EMAIL) or AWS SES env vars for email"
            .to_string(),
    ))
}
