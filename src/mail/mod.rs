//! Outbound mail for verification codes. Delivery is attempted once; a
//! failure is returned to the caller and nothing is queued.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{MailBackend, MailConfig};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl MailMessage {
    pub fn verification_code(from: &str, to: &str, code: &str, ttl_minutes: i64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Email Verification Code".to_string(),
            text: format!(
                "Your verification code is: {}\nIt expires in {} minutes.",
                code, ttl_minutes
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(to = %message.to, subject = %message.subject, "Mail not delivered (log backend)");
        tracing::debug!("Mail body: {}", message.text);
        Ok(())
    }
}

/// Posts each message as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    token: Option<String>,
}

impl HttpMailer {
    pub fn new(relay_url: String, token: Option<String>, timeout: Duration) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            relay_url,
            token,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        let mut request = self.client.post(&self.relay_url).json(&message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Mail relay returned {} for {}", status, message.to);
            return Err(MailError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match config.backend {
        MailBackend::Log => Ok(Arc::new(LogMailer)),
        MailBackend::Http => {
            let url = config
                .relay_url
                .clone()
                .ok_or(MailError::NotConfigured("MAIL_RELAY_URL"))?;
            let mailer = HttpMailer::new(
                url,
                config.relay_token.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(mailer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_message_contains_code() {
        let m = MailMessage::verification_code("noreply@example.com", "ada@example.com", "123456", 15);
        assert_eq!(m.to, "ada@example.com");
        assert!(m.text.contains("123456"));
        assert!(m.text.contains("15 minutes"));
    }

    #[test]
    fn http_backend_requires_relay_url() {
        let config = MailConfig {
            backend: MailBackend::Http,
            relay_url: None,
            relay_token: None,
            sender: "noreply@example.com".into(),
            timeout_secs: 5,
        };
        assert!(matches!(from_config(&config), Err(MailError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let m = MailMessage::verification_code("a@b.c", "d@e.f", "000001", 15);
        assert!(LogMailer.send(m).await.is_ok());
    }
}
