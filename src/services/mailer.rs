//! Outgoing mail.
//!
//! The account service only needs "send this HTML to that address"; Resend
//! is the production transport and tests plug in a recording double.

use async_trait::async_trait;
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

use crate::config::MailConfig;

const PASSWORD_RESET_TEMPLATE: &str = include_str!("../../templates/password_reset.html");
pub const PASSWORD_RESET_SUBJECT: &str = "Your BMUN password has been reset";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    #[must_use]
    pub fn new(config: &MailConfig) -> Self {
        Self { client: Resend::new(&config.api_key), from: config.from.clone() }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let email = CreateEmailBaseOptions::new(&self.from, [to], subject).with_html(html);
        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[must_use]
pub fn render_password_reset(username: &str, password: &str, login_url: &str) -> String {
    PASSWORD_RESET_TEMPLATE
        .replace("{{USERNAME}}", username)
        .replace("{{PASSWORD}}", password)
        .replace("{{LOGIN_URL}}", login_url)
}

#[cfg(test)]
#[path = "mailer_test.rs"]
mod tests;
