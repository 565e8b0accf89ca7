//! Template based mail delivery.
//!
//! [`EmailService::send`] loads a stored template, substitutes the caller's
//! variables, hands the message to a [`MailTransport`] and records the
//! attempt in `email_logs`, whatever its outcome. Providers:
//! - `console`: logs the message (development)
//! - `smtp`: delivers through an SMTP relay with `none`, `starttls` or
//!   `ssl/tls` encryption

use async_trait::async_trait;
use domain::models::MailSendStatus;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use persistence::repositories::{EmailLogRepository, MailTemplateRepository, NewEmailLog};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::SmtpConfig;
use crate::middleware::metrics::record_mail_delivery;

/// Errors that can occur during mail operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Mail template {0} not found")]
    TemplateNotFound(i64),

    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Mail delivery failed: {0}")]
    Delivery(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outbound channel for fully built messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Provider name used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: Message) -> Result<(), EmailError>;
}

/// Logs messages instead of sending them.
pub struct ConsoleTransport;

#[async_trait]
impl MailTransport for ConsoleTransport {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, message: Message) -> Result<(), EmailError> {
        let envelope = message.envelope();
        let to: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();
        let formatted = message.formatted();
        info!(
            from = ?envelope.from().map(|a| a.to_string()),
            to = ?to,
            size = formatted.len(),
            "Email (console provider)"
        );
        Ok(())
    }
}

/// Delivers through an SMTP relay.
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let builder = match config.encryption.as_str() {
            "ssl/tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| EmailError::Delivery(format!("SMTP TLS setup failed: {}", e)))?,
            "starttls" => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| EmailError::Delivery(format!("SMTP STARTTLS setup failed: {}", e)))?,
            _ => {
                warn!(
                    host = %config.host,
                    port = config.port,
                    "Using unencrypted SMTP transport"
                );
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        };

        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn deliver(&self, message: Message) -> Result<(), EmailError> {
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| EmailError::Delivery(e.to_string()))
    }
}

/// Builds the transport selected by `smtp.provider`.
pub fn transport_from_config(config: &SmtpConfig) -> Result<Arc<dyn MailTransport>, EmailError> {
    match config.provider.as_str() {
        "smtp" => Ok(Arc::new(SmtpTransport::new(config)?)),
        _ => Ok(Arc::new(ConsoleTransport)),
    }
}

/// Builds an HTML message, validating both addresses.
pub fn build_message(from: &str, to: &str, subject: &str, body: String) -> Result<Message, EmailError> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| EmailError::Address(format!("{}: {}", from, e)))?;
    let to: Mailbox = to
        .parse()
        .map_err(|e| EmailError::Address(format!("{}: {}", to, e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(body)
        .map_err(|e| EmailError::Address(e.to_string()))
}

/// Template mail sender. Built once at startup and shared through the
/// application state.
pub struct EmailService {
    from: String,
    templates: MailTemplateRepository,
    logs: EmailLogRepository,
    transport: Arc<dyn MailTransport>,
}

impl EmailService {
    pub fn new(pool: PgPool, from: impl Into<String>, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            from: from.into(),
            templates: MailTemplateRepository::new(pool.clone()),
            logs: EmailLogRepository::new(pool),
            transport,
        }
    }

    pub fn from_config(pool: PgPool, config: &SmtpConfig) -> Result<Self, EmailError> {
        Ok(Self::new(pool, config.from.clone(), transport_from_config(config)?))
    }

    pub fn provider(&self) -> &'static str {
        self.transport.name()
    }

    /// Renders template `tpl_id` with `vars` and delivers it to `to`.
    ///
    /// Every attempt leaves one `email_logs` row: status 1 with the rendered
    /// subject and body on success, status 0 with a diagnostic otherwise.
    pub async fn send(
        &self,
        user_id: i64,
        tpl_id: i64,
        to: &str,
        vars: &HashMap<String, String>,
    ) -> Result<(), EmailError> {
        let mut log = NewEmailLog {
            user_id,
            tpl_id,
            from: self.from.clone(),
            to: to.to_string(),
            subject: String::new(),
            contents: String::new(),
            status: MailSendStatus::Failed.as_i16(),
            logs: String::new(),
        };

        let template = match self.templates.find_by_id(tpl_id).await {
            Ok(Some(template)) => template,
            Ok(None) => {
                let err = EmailError::TemplateNotFound(tpl_id);
                log.logs = err.to_string();
                self.record(&log).await;
                return Err(err);
            }
            Err(e) => {
                log.logs = format!("template lookup failed: {}", e);
                self.record(&log).await;
                return Err(e.into());
            }
        };

        let body = template.render(vars);
        log.subject = template.subject.clone();
        log.contents = body.clone();

        let outcome = match build_message(&self.from, to, &template.subject, body) {
            Ok(message) => self.transport.deliver(message).await,
            Err(e) => Err(e),
        };

        record_mail_delivery(self.transport.name(), outcome.is_ok());

        match &outcome {
            Ok(()) => {
                log.status = MailSendStatus::Sent.as_i16();
                info!(tpl_id, to = %to, provider = self.transport.name(), "Mail sent");
            }
            Err(e) => {
                log.logs = e.to_string();
                warn!(tpl_id, to = %to, error = %e, "Mail delivery failed");
            }
        }

        self.record(&log).await;
        outcome
    }

    /// Writes the log row. A failure here never changes the send outcome.
    async fn record(&self, log: &NewEmailLog) {
        if let Err(e) = self.logs.insert(log).await {
            error!(tpl_id = log.tpl_id, to = %log.to, error = %e, "Failed to write email log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let result = build_message("noreply@example.com", "not an address", "s", "b".into());
        assert!(matches!(result, Err(EmailError::Address(_))));
    }

    #[test]
    fn test_build_message_headers() {
        let message = build_message(
            "noreply@example.com",
            "ops@example.com",
            "Login code",
            "<p>123456</p>".into(),
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Login code"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_console_transport_delivers() {
        let message =
            build_message("a@example.com", "b@example.com", "hi", "body".into()).unwrap();
        assert!(ConsoleTransport.deliver(message).await.is_ok());
    }

    #[test]
    fn test_transport_selection() {
        let console = transport_from_config(&SmtpConfig::default()).unwrap();
        assert_eq!(console.name(), "console");

        let smtp = transport_from_config(&SmtpConfig {
            provider: "smtp".into(),
            host: "localhost".into(),
            port: 2525,
            encryption: "none".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(smtp.name(), "smtp");
    }
}
