//! Outbound Mail
//!
//! Best-effort, fire-and-forget HTML mail. `dispatch` never blocks the caller
//! and never reports failure back; delivery errors are logged.
//!
//! Transports:
//! - SMTP (STARTTLS relay) when credentials are configured
//! - log-only when SMTP is not configured
//! - in-memory outbox for tests

use std::sync::{Arc, Mutex};

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

/// Mail errors (logged, never surfaced to HTTP clients)
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// SMTP settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_email: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_name: "Cirvee".to_string(),
            from_email: "noreply@cirvee.com".to_string(),
        }
    }
}

impl MailConfig {
    /// SMTP is used only when both credentials are present
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// One message to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Clone)]
enum Transport {
    Smtp {
        transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
        from: Mailbox,
    },
    Log,
    Memory(Arc<Mutex<Vec<OutgoingMail>>>),
}

/// Cloneable mail handle shared by all handlers
#[derive(Clone)]
pub struct Mailer {
    transport: Transport,
}

impl Mailer {
    /// Build from config; falls back to log-only when SMTP is not configured
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        if !config.is_configured() {
            tracing::warn!("SMTP not configured, outgoing mail will only be logged");
            return Ok(Self::log_only());
        }

        let from = Mailbox::new(
            Some(config.from_name.clone()),
            config.from_email.parse()?,
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport: Transport::Smtp {
                transport: Arc::new(transport),
                from,
            },
        })
    }

    pub fn log_only() -> Self {
        Self {
            transport: Transport::Log,
        }
    }

    /// Mailer that records every dispatched message
    pub fn in_memory() -> Self {
        Self {
            transport: Transport::Memory(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Messages captured by an in-memory mailer (empty for other transports)
    pub fn sent(&self) -> Vec<OutgoingMail> {
        match &self.transport {
            Transport::Memory(outbox) => outbox
                .lock()
                .map(|guard| guard.clone())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Queue a message without waiting for delivery
    ///
    /// At most once: a crash after dispatch drops the message.
    pub fn dispatch(&self, mail: OutgoingMail) {
        match &self.transport {
            Transport::Memory(outbox) => {
                if let Ok(mut guard) = outbox.lock() {
                    guard.push(mail);
                }
            }
            Transport::Log => {
                tracing::info!(to = %mail.to, subject = %mail.subject, "Mail skipped (SMTP not configured)");
            }
            Transport::Smtp { transport, from } => {
                let transport = Arc::clone(transport);
                let from = from.clone();
                tokio::spawn(async move {
                    let to = mail.to.clone();
                    let subject = mail.subject.clone();
                    match deliver(&transport, from, mail).await {
                        Ok(()) => tracing::info!(to = %to, subject = %subject, "Mail sent"),
                        Err(e) => {
                            tracing::warn!(error = %e, to = %to, subject = %subject, "Mail delivery failed")
                        }
                    }
                });
            }
        }
    }
}

async fn deliver(
    transport: &AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    mail: OutgoingMail,
) -> Result<(), MailError> {
    let message = Message::builder()
        .from(from)
        .to(mail.to.parse()?)
        .subject(mail.subject)
        .header(ContentType::TEXT_HTML)
        .body(mail.html_body)?;

    transport.send(message).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: "Welcome".to_string(),
            html_body: "<p>hi</p>".to_string(),
        }
    }

    #[test]
    fn test_unconfigured_smtp_is_log_only() {
        let config = MailConfig::default();
        assert!(!config.is_configured());

        let mailer = Mailer::from_config(&config).unwrap();
        mailer.dispatch(mail("a@example.com"));
        assert!(mailer.sent().is_empty());
    }

    #[test]
    fn test_in_memory_outbox_is_shared_between_clones() {
        let mailer = Mailer::in_memory();
        let clone = mailer.clone();
        clone.dispatch(mail("a@example.com"));
        clone.dispatch(mail("b@example.com"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, "b@example.com");
    }
}
