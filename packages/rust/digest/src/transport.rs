//! Transports that deliver a composed [`Digest`].

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, instrument};

use regwatch_shared::{DigestConfig, EmailCredentials, RegwatchError, Result};

use crate::compose::Digest;

/// Delivers a digest to the configured recipients.
#[async_trait]
pub trait DigestTransport: Send + Sync {
    async fn send(&self, credentials: &EmailCredentials, digest: &Digest) -> Result<()>;

    /// Human-readable transport name for tracing.
    fn name(&self) -> &str;
}

/// SMTP over implicit TLS, sent on the tokio runtime.
#[derive(Debug, Clone)]
pub struct SmtpDigestTransport {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpDigestTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(config.smtp_host.clone(), config.smtp_port)
    }
}

#[async_trait]
impl DigestTransport for SmtpDigestTransport {
    #[instrument(skip_all, fields(host = %self.host, port = self.port))]
    async fn send(&self, credentials: &EmailCredentials, digest: &Digest) -> Result<()> {
        let message = build_message(credentials, digest)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| RegwatchError::Notify(format!("{}: {e}", self.host)))?
            .port(self.port)
            .credentials(Credentials::new(
                credentials.from.clone(),
                credentials.password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build::<Tokio1Executor>();

        mailer
            .send(message)
            .await
            .map_err(|e| RegwatchError::Notify(format!("SMTP send failed: {e}")))?;

        debug!(recipients = credentials.to.len(), "digest delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

/// Multipart/alternative message with plain-text and HTML bodies.
pub fn build_message(credentials: &EmailCredentials, digest: &Digest) -> Result<Message> {
    let from = parse_mailbox(&credentials.from)?;
    let mut builder = Message::builder().from(from).subject(digest.subject.clone());
    for to in &credentials.to {
        builder = builder.to(parse_mailbox(to)?);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            digest.text.clone(),
            digest.html.clone(),
        ))
        .map_err(|e| RegwatchError::Notify(format!("failed to build message: {e}")))
}

fn parse_mailbox(raw: &str) -> Result<Mailbox> {
    raw.parse()
        .map_err(|e| RegwatchError::Notify(format!("invalid address {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(to: &[&str]) -> EmailCredentials {
        EmailCredentials {
            from: "monitor@example.com".into(),
            password: "secret".into(),
            to: to.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn digest() -> Digest {
        Digest {
            subject: "Weekly ESG Digest: 1 New Regulation".into(),
            text: "plain body".into(),
            html: "<p>html body</p>".into(),
            total: 1,
        }
    }

    #[test]
    fn message_has_both_parts_and_all_recipients() {
        let msg = build_message(&credentials(&["a@example.com", "b@example.com"]), &digest())
            .unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();

        assert!(raw.contains("Subject: Weekly ESG Digest: 1 New Regulation"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn invalid_recipient_is_a_notify_error() {
        let err = build_message(&credentials(&["not an address"]), &digest()).unwrap_err();
        assert!(matches!(err, RegwatchError::Notify(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_notify_error() {
        let mut transport = SmtpDigestTransport::new("127.0.0.1", 1);
        transport.timeout = Duration::from_secs(2);

        let err = transport
            .send(&credentials(&["a@example.com"]), &digest())
            .await
            .unwrap_err();
        assert!(matches!(err, RegwatchError::Notify(_)));
        assert!(err.to_string().contains("SMTP send failed"));
    }

    #[test]
    fn transport_uses_config_endpoint() {
        let transport = SmtpDigestTransport::from_config(&DigestConfig::default());
        assert_eq!(transport.host, "smtp.gmail.com");
        assert_eq!(transport.port, 465);
        assert_eq!(transport.name(), "smtp");
    }
}
