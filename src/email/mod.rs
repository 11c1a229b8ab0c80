/// Outgoing mail
///
/// Verification and password reset links are delivered over SMTP with lettre.
/// In mock mode messages are logged and kept in an in-memory outbox instead.

pub mod smtp;
pub mod templates;

use crate::app_config::EmailConfig;
use std::sync::{Arc, Mutex};

/// Email sending result
pub type EmailResult<T> = Result<T, EmailError>;

/// Email errors
#[derive(Debug)]
pub enum EmailError {
    /// SMTP configuration error
    ConfigError(String),
    /// Email building error
    BuildError(lettre::error::Error),
    /// Email sending error
    SendError(lettre::transport::smtp::Error),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::ConfigError(msg) => write!(f, "Email config error: {}", msg),
            EmailError::BuildError(e) => write!(f, "Email build error: {}", e),
            EmailError::SendError(e) => write!(f, "Email send error: {}", e),
        }
    }
}

impl std::error::Error for EmailError {}

impl From<lettre::error::Error> for EmailError {
    fn from(e: lettre::error::Error) -> Self {
        EmailError::BuildError(e)
    }
}

impl From<lettre::transport::smtp::Error> for EmailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        EmailError::SendError(e)
    }
}

/// A message captured in mock mode.
#[derive(Clone, Debug)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

/// Shared handle used by the account flows to send mail.
#[derive(Clone)]
pub struct Mailer {
    config: EmailConfig,
    site_name: String,
    outbox: Arc<Mutex<Vec<SentEmail>>>,
}

impl Mailer {
    pub fn new(config: EmailConfig, site_name: impl Into<String>) -> Self {
        if config.mock {
            log::warn!("Email is in mock mode; messages are logged, not delivered");
        }

        Self {
            config,
            site_name: site_name.into(),
            outbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mailer that never touches the network.
    pub fn mock(site_name: impl Into<String>) -> Self {
        Self::new(
            EmailConfig {
                mock: true,
                ..EmailConfig::default()
            },
            site_name,
        )
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Messages captured so far in mock mode, oldest first.
    pub fn sent(&self) -> Vec<SentEmail> {
        match self.outbox.lock() {
            Ok(outbox) => outbox.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Send an email
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body_text: &str,
        body_html: Option<&str>,
    ) -> EmailResult<()> {
        if self.config.mock {
            log::info!("MOCK EMAIL:");
            log::info!("  To: {}", to);
            log::info!("  Subject: {}", subject);
            log::info!("  Body: {}", body_text);

            let message = SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body_text: body_text.to_string(),
            };
            match self.outbox.lock() {
                Ok(mut outbox) => outbox.push(message),
                Err(poisoned) => poisoned.into_inner().push(message),
            }
            return Ok(());
        }

        smtp::send_email(&self.config, to, subject, body_text, body_html).await
    }
}
